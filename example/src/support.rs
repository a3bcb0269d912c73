use dtogen_runtime::JsonSerializable;

/// Target of the `User.label` delegation, shared by both variants.
///
/// Joins the display name and role of the wire form with `separator`.
pub fn label<T: JsonSerializable>(user: &T, separator: &str) -> String {
    let wire = user.to_json_value();
    let name = wire.get("display_name").and_then(|v| v.as_str()).unwrap_or("anonymous");
    let role = wire.get("role").and_then(|v| v.as_str()).unwrap_or("GUEST");
    format!("{}{}{}", name, separator, role)
}
