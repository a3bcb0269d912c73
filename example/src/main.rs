// example/src/main.rs

use dtogen_example::client::{PointImpl, Role, ShapeImpl, UserImpl};
use dtogen_example::legacy::LegacyNote;
use dtogen_example::{client, server};
use dtogen_runtime::{DecodeError, JsonSerializable};

fn main() -> Result<(), DecodeError> {
    // 1) Build a client-side user and look at its field-named wire form
    let mut user = UserImpl::new()
        .with_id("u-42")
        .with_display_name("Ada")
        .with_role(Role::Admin)
        .with_note(LegacyNote::new("migrated"));
    user.add_tags("admin".to_string());
    let text = user.to_json();
    println!("user         = {}", text);
    println!("label        = {}", user.label(" | "));

    // 2) The server variant reads the same text
    let server_user = server::UserImpl::from_json_str(&text)?.unwrap_or_default();
    println!("server role  = {:?}", server_user.get_role());

    // 3) Compact interfaces travel as arrays, holes included
    let mut shape = ShapeImpl::new().with_name("triangle");
    for (x, y) in [(0, 0), (4, 0), (2, 3)] {
        shape.add_outline(PointImpl::new().with_x(x).with_y(y));
    }
    println!("shape        = {}", shape.to_json());

    // 4) Dispatch by interface name
    let registry = client::registry();
    for name in registry.interface_names() {
        if let Some(provider) = registry.get(name) {
            println!("  {:<10} -> {}", name, provider.impl_name());
        }
    }

    Ok(())
}
