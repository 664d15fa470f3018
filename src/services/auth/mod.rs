pub mod claims;
pub mod error;
pub mod factory;
pub mod resolver;
pub mod token_codec;

pub use claims::Claims;
pub use error::AuthError;
pub use factory::build_token_codec;
pub use resolver::UserResolver;
pub use token_codec::TokenCodec;
