mod profile_auth;

pub use profile_auth::profile_auth;
