//! Identifier casing used for generated type names and file names.

use heck::{ToSnakeCase, ToUpperCamelCase};

/// `user_profiles` -> `UserProfiles`
pub fn snake_to_pascal(name: &str) -> String {
    name.to_upper_camel_case()
}

/// `UserProfiles` / `user-profiles` -> `user_profiles`
pub fn to_snake(name: &str) -> String {
    name.to_snake_case()
}
