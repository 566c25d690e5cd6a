use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// How to find an element: by ARIA role and accessible name, by visible
/// text, or by a CSS selector.
///
/// A locator may match more than one element. Under a non-count-bound wait
/// condition the first match in document order is used — a known ambiguity,
/// resolved deterministically rather than arbitrarily.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// ARIA role (explicit `role` attribute or the tag's implicit role),
    /// optionally narrowed by accessible name.
    Role { role: String, name: Option<String> },
    /// Element whose text content contains this string. Only the deepest
    /// matching elements are candidates.
    Text(String),
    /// Raw CSS selector.
    Css(String),
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Role {
                role,
                name: Some(name),
            } => write!(f, "role '{}' named '{}'", role, name),
            Self::Role { role, name: None } => write!(f, "role '{}'", role),
            Self::Text(text) => write!(f, "text '{}'", text),
            Self::Css(selector) => write!(f, "css '{}'", selector),
        }
    }
}

impl<'de> Deserialize<'de> for Locator {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(LocatorVisitor)
    }
}

struct LocatorVisitor;

impl<'de> Visitor<'de> for LocatorVisitor {
    type Value = Locator;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a locator map (css, text, or role with optional name)")
    }

    fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut css: Option<String> = None;
        let mut text: Option<String> = None;
        let mut role: Option<String> = None;
        let mut name: Option<String> = None;

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "css" => css = Some(map.next_value()?),
                "text" => text = Some(map.next_value()?),
                "role" => role = Some(map.next_value()?),
                "name" => name = Some(map.next_value()?),
                other => {
                    return Err(de::Error::unknown_field(
                        other,
                        &["css", "text", "role", "name"],
                    ))
                }
            }
        }

        match (css, text, role) {
            (Some(selector), None, None) => {
                if name.is_some() {
                    return Err(de::Error::custom("'name' is only valid with 'role'"));
                }
                Ok(Locator::Css(selector))
            }
            (None, Some(text), None) => {
                if name.is_some() {
                    return Err(de::Error::custom("'name' is only valid with 'role'"));
                }
                Ok(Locator::Text(text))
            }
            (None, None, Some(role)) => Ok(Locator::Role { role, name }),
            (None, None, None) => Err(de::Error::custom(
                "locator requires one of 'css', 'text', or 'role'",
            )),
            _ => Err(de::Error::custom(
                "locator takes exactly one of 'css', 'text', or 'role'",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let by_role = Locator::Role {
            role: "button".into(),
            name: Some("Start".into()),
        };
        assert_eq!(by_role.to_string(), "role 'button' named 'Start'");

        let bare_role = Locator::Role {
            role: "heading".into(),
            name: None,
        };
        assert_eq!(bare_role.to_string(), "role 'heading'");

        assert_eq!(Locator::Text("Sign in".into()).to_string(), "text 'Sign in'");
        assert_eq!(Locator::Css("h1".into()).to_string(), "css 'h1'");
    }

    #[test]
    fn test_deserialize_role_with_name() {
        let locator: Locator = serde_yaml::from_str("role: button\nname: Start\n").unwrap();
        assert_eq!(
            locator,
            Locator::Role {
                role: "button".into(),
                name: Some("Start".into()),
            }
        );
    }

    #[test]
    fn test_deserialize_name_without_role_fails() {
        let result: Result<Locator, _> = serde_yaml::from_str("text: Hello\nname: nope\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_empty_map_fails() {
        let result: Result<Locator, _> = serde_yaml::from_str("{}");
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_unknown_key_fails() {
        let result: Result<Locator, _> = serde_yaml::from_str("xpath: //h1\n");
        assert!(result.is_err());
    }
}
