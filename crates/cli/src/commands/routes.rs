//! `switchyard routes` — List the closed route set.

use switchyard_core::RouteLabel;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("Routes");
    println!("======\n");

    for route in RouteLabel::ALL {
        let kind = if route.is_catch_all() {
            "fallback"
        } else {
            "specialist"
        };
        println!("  {:<14} [{kind}]", route.as_str());
        println!("      {}", route.description());
    }

    Ok(())
}
