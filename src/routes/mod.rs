/// Router Module Index
///
/// The API routes, split by who may call them. All three are merged and nested
/// under `/api/v1` by `create_router`; a path may appear in more than one module
/// with different methods (e.g. `/users/{id}`).

/// Routes open to anonymous clients (sign-up, login).
pub mod public;

/// Routes protected by the `auth_middleware` route layer.
pub mod authenticated;

/// Routes whose handlers require the admin tier or Super Admin.
pub mod admin;
