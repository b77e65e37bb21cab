use super::models::LinkRequest;
use crate::common::{ValidationResult, Validator};

pub const MAX_URL_BYTES: usize = 2048;

impl Validator for LinkRequest {
    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        result
            .require("url", &self.url)
            .max_len("url", &self.url, MAX_URL_BYTES);

        let url = self.url.trim();
        if !url.is_empty() && !url.starts_with("http://") && !url.starts_with("https://") {
            result.add_error("url", "must start with http:// or https://");
        }

        result
    }
}
