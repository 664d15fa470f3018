/*!
 * Authentication extractors
 *
 * - BearerToken: raw token from `Authorization: Bearer <token>`
 * - CurrentUser: BearerToken + DbSession, resolved to a users row
 */

mod bearer;
mod current_user;

pub use bearer::BearerToken;
pub use current_user::CurrentUser;
