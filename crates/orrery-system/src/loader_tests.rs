use super::*;

use std::cell::RefCell;
use std::rc::Rc;

use orrery_parser::parse_str;

use crate::body::Body;
use crate::error::AssemblyError;
use crate::template::{PrototypeCatalog, Template};

const SMALL_SYSTEM: &str = "
name = Small
Epoch = 1000
mainMenuBody = Kerbin

Body
{
    name = Sun
    Template { name = Sun }
}
Body
{
    name = Kerbin
    Template { name = Kerbin }
}
Body
{
    name = Twin
    identifier = Orrery/Twin
    implements = Orrery/Moon
    Template
    {
        name = Mun
        removeTerrain = true
    }
    Properties
    {
        radius = 150000
        description = A smaller moon.
    }
    Orbit
    {
        semiMajorAxis = 30000000
        epoch = 5
    }
}
Body
{
    name = Sister
    Template { name = Mun }
    Orbit { referenceBody = Orrery/Twin }
}
Body
{
    name = Broken
    Properties { radius = 10 }
}
Body
{
    name = Sister
    Template { name = Minmus }
}
Asteroid
{
    name = Swarm
    Locations
    {
        Around { body = Orrery/Moon }
        Flyby { body = Ghost }
    }
}
Asteroid
{
    Locations { }
}
";

fn stock_context() -> LoadContext {
    LoadContext::new(PrototypeCatalog::stock().unwrap())
}

fn load(text: &str, ctx: &mut LoadContext) -> Result<PlanetarySystem, LoadError> {
    load_system(&parse_str(text, "test.cfg").unwrap(), ctx)
}

#[test]
fn test_load_small_system() {
    let system = load(SMALL_SYSTEM, &mut stock_context()).unwrap();

    assert_eq!(system.settings().name.as_deref(), Some("Small"));
    assert_eq!(system.len(), 4);
    assert_eq!(system.body(system.root()).name, "Sun");
    assert_eq!(system.body(system.home()).name, "Kerbin");

    let twin = system.lookup("Orrery/Moon").unwrap();
    assert_eq!(twin.name, "Twin");
    assert_eq!(twin.properties.radius, 150_000.0);
    assert!(twin.terrain.is_none());
    assert_eq!(twin.orbit.as_ref().unwrap().epoch, 1005.0);
    assert_eq!(twin.orbit.as_ref().unwrap().semi_major_axis, 30_000_000.0);

    let sister = system.lookup("Sister").unwrap();
    assert_eq!(system.parent(system.resolve("Sister").unwrap()), system.resolve("Twin"));
    assert_eq!(sister.orbit.as_ref().unwrap().epoch, 0.0);

    let home_children: Vec<&str> = system
        .children(system.home())
        .iter()
        .map(|&id| system.body(id).name.as_str())
        .collect();
    assert_eq!(home_children, ["Twin"]);
}

#[test]
fn test_failures_are_discarded_not_fatal() {
    let system = load(SMALL_SYSTEM, &mut stock_context()).unwrap();
    let discarded: Vec<(&str, &str)> = system
        .discarded()
        .iter()
        .map(|d| (d.kind.as_str(), d.name.as_str()))
        .collect();
    assert_eq!(
        discarded,
        [("Body", "Broken"), ("Body", "Sister"), ("Asteroid", "")]
    );
    assert_eq!(system.discarded()[1].reason, "duplicate name");
    assert_eq!(system.asteroids().len(), 1);
    assert_eq!(system.asteroids()[0].name, "Swarm");
}

#[test]
fn test_template_clones_are_isolated() {
    let text = "
Body { name = Sun\nTemplate { name = Sun } }
Body { name = Kerbin\nTemplate { name = Kerbin } }
Body
{
    name = Left
    Template { name = Mun }
    Properties { radius = 123000 }
    Terrain { Mods { VertexNoise { order = 5 } } }
}
Body
{
    name = Right
    Template { name = Mun }
}
";
    let system = load(text, &mut stock_context()).unwrap();
    let left = system.lookup("Left").unwrap();
    let right = system.lookup("Right").unwrap();

    assert_eq!(left.properties.radius, 123_000.0);
    assert_eq!(right.properties.radius, 200_000.0);
    let left_mods = &left.terrain.as_ref().unwrap().mods;
    let right_mods = &right.terrain.as_ref().unwrap().mods;
    assert_eq!(left_mods.len(), right_mods.len() + 1);
    assert!(right_mods.iter().all(|m| m.kind != "VertexNoise"));

    // Both clones keep the stock flight index, so one of them moves.
    assert_ne!(left.flight_index, right.flight_index);
}

#[test]
fn test_unresolved_reference_aborts_load() {
    let text = "
Body { name = Sun\nTemplate { name = Sun } }
Body { name = Kerbin\nTemplate { name = Kerbin } }
Body
{
    name = Stray
    Template { name = Mun }
    Orbit { referenceBody = Kerbinn }
}
";
    let err = load(text, &mut stock_context()).unwrap_err();
    assert!(matches!(
        err,
        LoadError::Assembly(AssemblyError::UnresolvedReference { ref reference, .. })
            if reference == "Kerbinn"
    ));
}

#[test]
fn test_lifecycle_events() {
    let mut ctx = stock_context();
    let log = Rc::new(RefCell::new(Vec::new()));

    let sink = Rc::clone(&log);
    ctx.events.on_template_applied(move |t: &Template| {
        sink.borrow_mut().push(format!("template {}", t.name))
    });
    let sink = Rc::clone(&log);
    ctx.events
        .on_body_post_apply(move |b: &Body| sink.borrow_mut().push(format!("post {}", b.name)));
    let sink = Rc::clone(&log);
    ctx.events
        .on_body_loaded(move |b: &Body| sink.borrow_mut().push(format!("loaded {}", b.name)));
    let sink = Rc::clone(&log);
    ctx.events
        .on_bodies_loaded(move |b: &[Body]| sink.borrow_mut().push(format!("all {}", b.len())));
    let sink = Rc::clone(&log);
    ctx.events.on_system_assembled(move |s: &PlanetarySystem| {
        sink.borrow_mut().push(format!("assembled {}", s.len()))
    });

    let text = "
Body { name = Sun\nTemplate { name = Sun } }
Body { name = Kerbin\nTemplate { name = Kerbin } }
";
    load(text, &mut ctx).unwrap();
    assert_eq!(
        *log.borrow(),
        [
            "template Sun",
            "post Sun",
            "template Kerbin",
            "post Kerbin",
            "loaded Sun",
            "loaded Kerbin",
            "all 2",
            "assembled 2",
        ]
    );
}

#[test]
fn test_strict_mode_rejects_unknown_entries() {
    let text = "
Body { name = Sun\nTemplate { name = Sun } }
Body { name = Kerbin\nTemplate { name = Kerbin } }
Body
{
    name = Typo
    Template { name = Mun }
    Propertiez { radius = 1 }
}
";
    let system = load(text, &mut stock_context()).unwrap();
    assert!(system.lookup("Typo").is_some());

    let mut strict = stock_context();
    strict.strict = true;
    let system = load(text, &mut strict).unwrap();
    assert!(system.lookup("Typo").is_none());
    assert!(system.discarded()[0].reason.contains("Propertiez"));
}

#[test]
fn test_unknown_template_discards_body() {
    let text = "
Body { name = Sun\nTemplate { name = Sun } }
Body { name = Kerbin\nTemplate { name = Kerbin } }
Body { name = Vulcan\nTemplate { name = Romulus } }
";
    let system = load(text, &mut stock_context()).unwrap();
    assert_eq!(system.len(), 2);
    assert_eq!(
        system.discarded()[0].reason,
        "Template: name: template \"Romulus\" does not name a known prototype body"
    );
}

#[test]
fn test_load_files_merges_sources() {
    let dir = tempfile::tempdir().unwrap();
    let star = dir.path().join("star.cfg");
    let planets = dir.path().join("planets.cfg");
    std::fs::write(&star, "Epoch = 50\nBody\n{\n\tname = Sun\n\tTemplate { name = Sun }\n}\n")
        .unwrap();
    std::fs::write(
        &planets,
        "Body\n{\n\tname = Kerbin\n\tTemplate { name = Kerbin }\n\tOrbit { epoch = 1 }\n}\n",
    )
    .unwrap();

    let mut ctx = stock_context();
    let system = load_files(&[&star, &planets], &mut ctx).unwrap();
    assert_eq!(system.len(), 2);
    assert_eq!(system.settings().epoch, Some(50.0));
    assert_eq!(
        system.lookup("Kerbin").unwrap().orbit.as_ref().unwrap().epoch,
        51.0
    );

    let missing = dir.path().join("missing.cfg");
    let err = load_files(&[missing], &mut ctx).unwrap_err();
    assert!(matches!(err, LoadError::Parse(_)));
}

#[test]
fn test_epoch_offset_is_scoped_to_one_load() {
    let with_epoch = "
Epoch = 50
Body { name = Sun\nTemplate { name = Sun } }
Body
{
    name = Kerbin
    Template { name = Kerbin }
    Orbit { epoch = 1 }
}
";
    let without_epoch = "
Body { name = Sun\nTemplate { name = Sun } }
Body
{
    name = Kerbin
    Template { name = Kerbin }
    Orbit { epoch = 1 }
}
";
    let mut ctx = stock_context();
    ctx.epoch = 100.0;

    let system = load(with_epoch, &mut ctx).unwrap();
    let kerbin_epoch = |system: &PlanetarySystem| {
        system.lookup("Kerbin").unwrap().orbit.as_ref().unwrap().epoch
    };
    assert_eq!(kerbin_epoch(&system), 151.0);
    assert_eq!(ctx.epoch, 100.0);

    let system = load(without_epoch, &mut ctx).unwrap();
    assert_eq!(kerbin_epoch(&system), 101.0);
    assert_eq!(ctx.epoch, 100.0);

    // The offset is restored when assembly fails too.
    let broken = format!("{with_epoch}\nBody {{ name = Lost\nTemplate {{ name = Mun }}\nOrbit {{ referenceBody = Nowhere }} }}");
    assert!(load(&broken, &mut ctx).is_err());
    assert_eq!(ctx.epoch, 100.0);
}

#[test]
fn test_invalid_settings_abort() {
    let err = load("timeScale = 0", &mut stock_context()).unwrap_err();
    assert!(matches!(err, LoadError::Settings(_)));
}

#[test]
fn test_stock_system_round_trips_through_catalog() {
    let catalog = PrototypeCatalog::stock().unwrap();
    let mut text = String::new();
    for name in catalog.names() {
        text.push_str(&format!("Body\n{{\n\tname = {name}\n\tTemplate {{ name = {name} }}\n}}\n"));
    }
    let system = load(&text, &mut LoadContext::new(catalog)).unwrap();
    assert_eq!(system.len(), 17);
    assert_eq!(system.lookup("Kerbin").unwrap().flight_index, 1);
    assert_eq!(system.lookup("Sun").unwrap().flight_index, 0);
    assert_eq!(system.lookup("Mun").unwrap().flight_index, 2);
    assert_eq!(system.lookup("Eeloo").unwrap().flight_index, 16);

    let jool = system.resolve("Jool").unwrap();
    let moons: Vec<&str> = system
        .children(jool)
        .iter()
        .map(|&id| system.body(id).name.as_str())
        .collect();
    assert_eq!(moons, ["Laythe", "Vall", "Tylo", "Bop", "Pol"]);
}
