//! Enhancing the contents of an editable text field in place.
//!
//! The field is owned by the caller and handed in explicitly; nothing here
//! tracks which field has focus.

use enhancer_types::EnhancementResult;

use crate::enhancer::Enhancer;
use crate::transport::HttpTransport;

/// Shown in the field while the request is in flight.
pub const PLACEHOLDER: &str = "✨ Enhancing prompt...";

pub const EMPTY_FIELD_MESSAGE: &str = "No text to enhance. Please type something first.";

/// An editable piece of text: a form input, an editor buffer, a file body.
pub trait TextField {
    fn read(&self) -> String;
    fn write(&mut self, text: &str);
}

impl TextField for String {
    fn read(&self) -> String {
        self.clone()
    }

    fn write(&mut self, text: &str) {
        self.clear();
        self.push_str(text);
    }
}

/// Replace the field's text with its enhancement.
///
/// Blank fields are refused without a request. While waiting the field shows
/// [`PLACEHOLDER`]; on failure the original text is put back.
pub async fn enhance_field<T, F>(
    enhancer: &Enhancer<T>,
    field: &mut F,
    provider: &str,
    credential: Option<&str>,
) -> EnhancementResult
where
    T: HttpTransport,
    F: TextField + ?Sized,
{
    let original = field.read();
    if original.trim().is_empty() {
        return EnhancementResult::Failure {
            message: EMPTY_FIELD_MESSAGE.to_string(),
        };
    }

    field.write(PLACEHOLDER);
    let result = enhancer.enhance(&original, provider, credential).await;

    match &result {
        EnhancementResult::Success { text } => field.write(text),
        EnhancementResult::Failure { .. } => field.write(&original),
    }
    result
}
