//! Input constraints shared by the tool requests
//!
//! Every check returns the message reported to the client on failure. Checks
//! that normalize their input (trimming, uppercasing) take it by `&mut`.

use std::f64::consts::TAU;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Longest object or material name Blender stores
pub const NAME_MAX_LEN: usize = 63;

/// Characters rejected in new object and material names
pub const INVALID_NAME_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Bound on location components
pub const LOCATION_LIMIT: f64 = 10_000.0;

/// Bound on object scale components
pub const SCALE_LIMIT: f64 = 1000.0;

/// Bound on sizes, radii and depths
pub const EXTENT_LIMIT: f64 = 1000.0;

/// Sizes at or below this are degenerate
pub const MIN_EXTENT: f64 = 0.001;

/// Image extensions accepted for render output
pub const RENDER_EXTENSIONS: [&str; 6] = [".png", ".jpg", ".jpeg", ".bmp", ".tiff", ".exr"];

/// A tool request read from raw JSON arguments
///
/// Implementations read each field through [`Arguments`] and check it before
/// moving on, in declaration order, so the first reported problem is the
/// first field that is wrong, whether in shape or in value.
pub trait ToolInput: Sized {
    fn parse(args: &Arguments) -> Result<Self, String>;
}

/// Read `arguments` into a request of type `I`
pub fn parse<I: ToolInput>(arguments: Value) -> Result<I, String> {
    I::parse(&Arguments::from_value(arguments)?)
}

/// The argument object of one tool call
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    map: Map<String, Value>,
}

impl Arguments {
    /// Wrap a call's arguments; `null` counts as no arguments
    pub fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Object(map) => Ok(Self { map }),
            Value::Null => Ok(Self::default()),
            other => Err(format!(
                "invalid type: {}, expected an object of tool arguments",
                kind(&other)
            )),
        }
    }

    /// A field that must be present
    pub fn required<T: DeserializeOwned>(&self, field: &str) -> Result<T, String> {
        match self.map.get(field) {
            Some(value) => decode(field, value),
            None => Err(format!("missing field `{field}`")),
        }
    }

    /// A field that falls back to `default` when absent
    pub fn optional<T: DeserializeOwned>(
        &self,
        field: &str,
        default: impl FnOnce() -> T,
    ) -> Result<T, String> {
        match self.map.get(field) {
            Some(value) => decode(field, value),
            None => Ok(default()),
        }
    }
}

fn decode<T: DeserializeOwned>(field: &str, value: &Value) -> Result<T, String> {
    <T as serde::Deserialize>::deserialize(value).map_err(|e| format!("{field}: {e}"))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Trim a name used to look up an existing object or material
pub fn lookup_name(field: &str, value: &mut String) -> Result<(), String> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len == 0 || len > NAME_MAX_LEN {
        return Err(format!(
            "{field} must be between 1 and {NAME_MAX_LEN} characters"
        ));
    }
    *value = trimmed.to_string();
    Ok(())
}

/// Trim and check the name of a new object or material
pub fn new_name(field: &str, value: &mut String) -> Result<(), String> {
    lookup_name(field, value)?;
    if value.contains(INVALID_NAME_CHARS) {
        let listed: Vec<String> = INVALID_NAME_CHARS.iter().map(char::to_string).collect();
        return Err(format!("Name cannot contain: {}", listed.join(", ")));
    }
    Ok(())
}

/// Size, radius or depth in `(0.001, 1000.0]`
pub fn extent(field: &str, value: f64) -> Result<(), String> {
    if value <= MIN_EXTENT {
        return Err(format!("{field} must be greater than {MIN_EXTENT}"));
    }
    if value > EXTENT_LIMIT {
        return Err(format!("{field} must be less than or equal to {EXTENT_LIMIT:?}"));
    }
    Ok(())
}

/// Float in the closed range `[min, max]`
pub fn float_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), String> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(format!("{field} must be between {min:?} and {max:?}"))
    }
}

/// Integer in the closed range `[min, max]`
pub fn int_range(field: &str, value: u32, min: u32, max: u32) -> Result<(), String> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(format!("{field} must be between {min} and {max}"))
    }
}

pub fn location(value: [f64; 3]) -> Result<(), String> {
    if value.iter().all(|c| c.abs() <= LOCATION_LIMIT) {
        Ok(())
    } else {
        Err(format!("Location coordinates must be within ±{LOCATION_LIMIT:?}"))
    }
}

/// Generic vector bound used for creation-time transforms
pub fn vector(value: [f64; 3]) -> Result<(), String> {
    if value.iter().all(|c| c.abs() <= LOCATION_LIMIT) {
        Ok(())
    } else {
        Err(format!("Vector coordinates must be within ±{LOCATION_LIMIT:?}"))
    }
}

/// Euler rotation within one full turn either way
pub fn rotation(value: [f64; 3]) -> Result<(), String> {
    if value.iter().all(|c| c.abs() <= TAU) {
        Ok(())
    } else {
        Err("Rotation values should be within ±2π radians (approximately ±360 degrees)".to_string())
    }
}

/// Creation-time scale, zero allowed
pub fn creation_scale(value: [f64; 3]) -> Result<(), String> {
    if !value.iter().all(|&c| c >= 0.0) {
        return Err("Scale values must be >= 0.0".to_string());
    }
    if !value.iter().all(|&c| c <= SCALE_LIMIT) {
        return Err(format!("Scale values must be <= {SCALE_LIMIT:?}"));
    }
    Ok(())
}

/// Scale applied to an existing object, strictly positive
pub fn object_scale(value: [f64; 3]) -> Result<(), String> {
    if !value.iter().all(|&c| c > 0.0) {
        return Err("Scale values must be positive (greater than 0)".to_string());
    }
    if !value.iter().all(|&c| c <= SCALE_LIMIT) {
        return Err(format!("Scale values must be <= {SCALE_LIMIT:?}"));
    }
    Ok(())
}

pub fn color(value: [f64; 3]) -> Result<(), String> {
    if value.iter().all(|c| (0.0..=1.0).contains(c)) {
        Ok(())
    } else {
        Err("Color values must be between 0.0 and 1.0".to_string())
    }
}

/// Uppercase `value` and check it against `allowed`
pub fn one_of(label: &str, value: &mut String, allowed: &[&str]) -> Result<(), String> {
    let upper = value.trim().to_uppercase();
    if !allowed.contains(&upper.as_str()) {
        return Err(format!("{label} must be one of: {}", allowed.join(", ")));
    }
    *value = upper;
    Ok(())
}

/// Render output path with a known image extension
pub fn image_path(value: &str) -> Result<(), String> {
    let lower = value.to_lowercase();
    if RENDER_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        Ok(())
    } else {
        Err(format!(
            "Filepath must end with one of: {}",
            RENDER_EXTENSIONS.join(", ")
        ))
    }
}

/// Trim a `.blend` document path
pub fn document_path(value: &mut String) -> Result<(), String> {
    let trimmed = value.trim();
    if !trimmed.to_lowercase().ends_with(".blend") {
        return Err("Filepath must end with .blend extension".to_string());
    }
    *value = trimmed.to_string();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_trimmed() {
        let mut name = "  Table ".to_string();
        new_name("name", &mut name).unwrap();
        assert_eq!(name, "Table");
    }

    #[test]
    fn test_name_length_counts_after_trim() {
        let mut blank = "   ".to_string();
        assert_eq!(
            new_name("name", &mut blank).unwrap_err(),
            "name must be between 1 and 63 characters"
        );

        let mut long = "a".repeat(64);
        assert!(lookup_name("name", &mut long).is_err());

        let mut padded = format!(" {} ", "a".repeat(63));
        assert!(lookup_name("name", &mut padded).is_ok());
    }

    #[test]
    fn test_new_names_reject_path_characters() {
        let mut name = "a/b".to_string();
        assert_eq!(
            new_name("name", &mut name).unwrap_err(),
            r#"Name cannot contain: /, \, :, *, ?, ", <, >, |"#
        );

        // Lookup names are only length-checked
        let mut name = "a/b".to_string();
        assert!(lookup_name("name", &mut name).is_ok());
    }

    #[test]
    fn test_extent_bounds() {
        assert!(extent("size", 0.001).is_err());
        assert!(extent("size", 0.0011).is_ok());
        assert!(extent("size", 1000.0).is_ok());
        assert_eq!(
            extent("size", 1000.5).unwrap_err(),
            "size must be less than or equal to 1000.0"
        );
        assert_eq!(extent("size", 0.0).unwrap_err(), "size must be greater than 0.001");
    }

    #[test]
    fn test_vector_bounds() {
        assert!(location([10_000.0, -10_000.0, 0.0]).is_ok());
        assert_eq!(
            location([0.0, 10_000.1, 0.0]).unwrap_err(),
            "Location coordinates must be within ±10000.0"
        );
        assert!(rotation([TAU, -TAU, 0.0]).is_ok());
        assert!(rotation([7.0, 0.0, 0.0]).is_err());
        assert!(color([0.0, 1.0, 0.5]).is_ok());
        assert!(color([1.01, 0.0, 0.0]).is_err());
    }

    #[test]
    fn test_scale_rules_differ_at_zero() {
        assert!(creation_scale([0.0, 1.0, 1.0]).is_ok());
        assert_eq!(
            object_scale([0.0, 1.0, 1.0]).unwrap_err(),
            "Scale values must be positive (greater than 0)"
        );
        assert_eq!(
            creation_scale([-1.0, 1.0, 1.0]).unwrap_err(),
            "Scale values must be >= 0.0"
        );
        assert_eq!(
            object_scale([1.0, 1001.0, 1.0]).unwrap_err(),
            "Scale values must be <= 1000.0"
        );
    }

    #[test]
    fn test_one_of_normalizes_case() {
        let mut value = "point".to_string();
        one_of("Light type", &mut value, &["SUN", "POINT"]).unwrap();
        assert_eq!(value, "POINT");

        let mut value = "laser".to_string();
        assert_eq!(
            one_of("Light type", &mut value, &["SUN", "POINT"]).unwrap_err(),
            "Light type must be one of: SUN, POINT"
        );
    }

    #[test]
    fn test_paths() {
        assert!(image_path("/tmp/OUT.PNG").is_ok());
        assert!(image_path("/tmp/out.exr").is_ok());
        assert!(image_path("/tmp/out.gif").is_err());

        let mut doc = "  /tmp/scene.blend  ".to_string();
        document_path(&mut doc).unwrap();
        assert_eq!(doc, "/tmp/scene.blend");

        let mut doc = "/tmp/scene.txt".to_string();
        assert_eq!(
            document_path(&mut doc).unwrap_err(),
            "Filepath must end with .blend extension"
        );
    }

    #[test]
    fn test_arguments_report_field_and_shape() {
        let args = Arguments::from_value(serde_json::json!({"size": "big"})).unwrap();
        assert_eq!(
            args.required::<f64>("size").unwrap_err(),
            "size: invalid type: string \"big\", expected f64"
        );
        assert_eq!(
            args.required::<String>("name").unwrap_err(),
            "missing field `name`"
        );
        assert_eq!(args.optional("depth", || 2.0).unwrap(), 2.0);
    }

    #[test]
    fn test_null_optional_and_null_arguments() {
        let args = Arguments::from_value(serde_json::json!({"location": null})).unwrap();
        assert_eq!(
            args.optional::<Option<[f64; 3]>>("location", || None).unwrap(),
            None
        );

        let empty = Arguments::from_value(Value::Null).unwrap();
        assert_eq!(empty.optional("segments", || 32u32).unwrap(), 32);
        assert!(Arguments::from_value(serde_json::json!([1, 2])).is_err());
    }
}
