use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// A wrapper for sensitive inbound values (plain-text passwords) that masks
/// the value in Debug and Display output.
#[derive(Clone, Deserialize)]
pub struct Masked<T>(pub T);

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Masking applies to log macros like tracing::debug!("{:?}", req);
        // serialization keeps the real value for the layers that need it.
        self.0.serialize(serializer)
    }
}

impl<T> Masked<T> {
    /// Deliberate access to the wrapped value.
    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_output_is_masked() {
        let secret = Masked("Hunter2!".to_string());
        assert_eq!(format!("{:?}", secret), "********");
        assert_eq!(format!("{}", secret), "********");
        assert_eq!(secret.expose(), "Hunter2!");
    }

    #[test]
    fn test_deserializes_transparently() {
        let secret: Masked<String> = serde_json::from_str("\"Hunter2!\"").unwrap();
        assert_eq!(secret.into_inner(), "Hunter2!");
    }
}
