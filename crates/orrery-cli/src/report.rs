//! Text rendering of an assembled system.

use std::fmt::Write;

use orrery_system::PlanetarySystem;

/// Renders the body tree, one line per body in depth-first order.
///
/// With `at`, each line also carries the body's position relative to its
/// parent at that universal time, when the orbit is closed.
pub fn render(system: &PlanetarySystem, at: Option<f64>) -> String {
    let mut out = String::new();
    if let Some(name) = &system.settings().name {
        let _ = writeln!(out, "{name}");
    }
    for (_, depth, body) in system.depth_first() {
        let indent = "  ".repeat(depth);
        let _ = write!(
            out,
            "{indent}[{:>2}] {} ({})",
            body.flight_index,
            body.display_name(),
            body.primary_identifier()
        );
        if let Some(orbit) = &body.orbit {
            let _ = write!(
                out,
                " soi={:.0}m period={:.0}s",
                body.state.sphere_of_influence, body.state.period
            );
            if let Some(time) = at
                && let Some(position) = orbit.position_at_time(&body.state, time)
            {
                let _ = write!(
                    out,
                    " pos=({:.0}, {:.0}, {:.0})",
                    position.x, position.y, position.z
                );
            }
        }
        if body.is_home {
            out.push_str(" *home*");
        }
        out.push('\n');
    }
    out
}
