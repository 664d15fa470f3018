/*
 * Responsibility
 * - Cross-cutting middleware (request id, tracing, limits)
 * - Authentication is not a layer here: handlers opt in via the CurrentUser extractor
 */
pub mod http;
