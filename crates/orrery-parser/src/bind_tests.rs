//! Unit tests for the declarative binder.

use std::sync::LazyLock;

use crate::bind::{BindContext, Bindable, Member, Schema, bind, create};
use crate::convert::FloatCurve;
use crate::error::{BindError, ConvertError};
use crate::node::ConfigNode;

#[derive(Default)]
struct Journal {
    events: Vec<String>,
    strict: bool,
}

impl BindContext for Journal {
    fn strict(&self) -> bool {
        self.strict
    }
}

#[derive(Default, Debug)]
struct Planet {
    name: String,
    kind: Option<String>,
    radius: f64,
    description: String,
    tags: Vec<String>,
    atmosphere: Option<Atmosphere>,
    rings: Vec<Ring>,
    moons: Vec<Ring>,
    notes: Option<ConfigNode>,
    curve: Option<FloatCurve>,
}

#[derive(Default, Debug, PartialEq)]
struct Atmosphere {
    pressure: f64,
    height: f64,
}

#[derive(Default, Debug, PartialEq)]
struct Ring {
    kind: String,
    inner: f64,
}

impl Bindable for Planet {
    type Context = Journal;

    fn schema() -> &'static Schema<Self, Journal> {
        static SCHEMA: LazyLock<Schema<Planet, Journal>> = LazyLock::new(|| {
            Schema::new("Planet")
                .member(Member::field("name", |p: &mut Planet| &mut p.name).required())
                .member(Member::optional("kind", |p: &mut Planet| &mut p.kind).pre_apply())
                .member(Member::field("radius", |p: &mut Planet| &mut p.radius).alias("r"))
                .member(
                    Member::field("description", |p: &mut Planet| &mut p.description)
                        .join_all(" "),
                )
                .member(Member::each(
                    "tag",
                    |p: &mut Planet, tag: String, _: &mut Journal| {
                        p.tags.push(tag);
                        Ok(())
                    },
                ))
                .member(Member::child("Atmosphere", |p: &mut Planet| &mut p.atmosphere).merge())
                .member(Member::collection("Rings", |p: &mut Planet| &mut p.rings))
                .member(Member::list("Moon", |p: &mut Planet| &mut p.moons).merge())
                .member(Member::raw_node("Notes", |p: &mut Planet| &mut p.notes))
                .member(Member::node_value("Curve", |p: &mut Planet| &mut p.curve))
        });
        &SCHEMA
    }

    fn apply(&mut self, _node: &ConfigNode, ctx: &mut Journal) -> Result<(), BindError> {
        ctx.events.push(format!(
            "Planet.apply kind={:?} radius={}",
            self.kind, self.radius
        ));
        Ok(())
    }

    fn post_apply(&mut self, _node: &ConfigNode, ctx: &mut Journal) -> Result<(), BindError> {
        ctx.events.push("Planet.post_apply".into());
        if self.radius < 0.0 {
            return Err(BindError::Rejected(format!("{} has a negative radius", self.name)));
        }
        Ok(())
    }
}

impl Bindable for Atmosphere {
    type Context = Journal;

    fn schema() -> &'static Schema<Self, Journal> {
        static SCHEMA: LazyLock<Schema<Atmosphere, Journal>> = LazyLock::new(|| {
            Schema::new("Atmosphere")
                .member(Member::field("pressure", |a: &mut Atmosphere| &mut a.pressure))
                .member(Member::field("height", |a: &mut Atmosphere| &mut a.height))
        });
        &SCHEMA
    }

    fn post_apply(&mut self, _node: &ConfigNode, ctx: &mut Journal) -> Result<(), BindError> {
        ctx.events.push("Atmosphere.post_apply".into());
        Ok(())
    }
}

impl Bindable for Ring {
    type Context = Journal;

    fn schema() -> &'static Schema<Self, Journal> {
        static SCHEMA: LazyLock<Schema<Ring, Journal>> = LazyLock::new(|| {
            Schema::new("Ring")
                .member(Member::field("inner", |r: &mut Ring| &mut r.inner))
                .lenient()
        });
        &SCHEMA
    }

    fn apply(&mut self, node: &ConfigNode, _ctx: &mut Journal) -> Result<(), BindError> {
        self.kind = node.name().to_owned();
        Ok(())
    }
}

fn planet_node() -> ConfigNode {
    ConfigNode::new("Planet")
        .with_value("radius", "600000")
        .with_value("name", "Kerbin")
        .with_value("kind", "rocky")
        .with_node(
            ConfigNode::new("Atmosphere")
                .with_value("pressure", "101.325")
                .with_value("height", "70000"),
        )
}

#[test]
fn test_lifecycle_order_is_pre_apply_apply_members_post_apply() {
    let mut journal = Journal::default();
    let planet: Planet = create(&planet_node(), &mut journal).unwrap();
    assert_eq!(
        journal.events,
        [
            "Planet.apply kind=Some(\"rocky\") radius=0",
            "Atmosphere.post_apply",
            "Planet.post_apply",
        ]
    );
    assert_eq!(planet.name, "Kerbin");
    assert_eq!(planet.radius, 600000.0);
}

#[test]
fn test_missing_required_member_fails() {
    let node = ConfigNode::new("Planet").with_value("radius", "1");
    let err = create::<Planet>(&node, &mut Journal::default()).unwrap_err();
    assert!(matches!(
        err,
        BindError::MissingRequired {
            target: "Planet",
            key: "name"
        }
    ));
}

#[test]
fn test_merge_member_keeps_identity_and_later_entries_win() {
    let mut journal = Journal::default();
    let mut planet: Planet = create(&planet_node(), &mut journal).unwrap();
    let before: *const Atmosphere = planet.atmosphere.as_ref().unwrap();

    let patch = ConfigNode::new("Planet").with_value("name", "Kerbin").with_node(
        ConfigNode::new("Atmosphere").with_value("height", "84000"),
    );
    bind(&patch, &mut planet, &mut journal).unwrap();

    let after: *const Atmosphere = planet.atmosphere.as_ref().unwrap();
    assert!(std::ptr::eq(before, after));
    assert_eq!(
        planet.atmosphere,
        Some(Atmosphere {
            pressure: 101.325,
            height: 84000.0
        })
    );
}

#[test]
fn test_collection_preserves_order_and_element_names() {
    let node = ConfigNode::new("Planet").with_value("name", "Jool").with_node(
        ConfigNode::new("Rings")
            .with_node(ConfigNode::new("Dust").with_value("inner", "1"))
            .with_node(ConfigNode::new("Ice").with_value("inner", "2")),
    );
    let planet: Planet = create(&node, &mut Journal::default()).unwrap();
    assert_eq!(
        planet.rings,
        [
            Ring {
                kind: "Dust".into(),
                inner: 1.0
            },
            Ring {
                kind: "Ice".into(),
                inner: 2.0
            },
        ]
    );
}

#[test]
fn test_empty_collection_node_clears_and_absent_leaves_untouched() {
    let mut journal = Journal::default();
    let mut planet = Planet {
        rings: vec![Ring::default()],
        ..Planet::default()
    };
    bind(
        &ConfigNode::new("Planet").with_value("name", "a"),
        &mut planet,
        &mut journal,
    )
    .unwrap();
    assert_eq!(planet.rings.len(), 1);

    let node = ConfigNode::new("Planet")
        .with_value("name", "a")
        .with_node(ConfigNode::new("Rings"));
    bind(&node, &mut planet, &mut journal).unwrap();
    assert!(planet.rings.is_empty());
}

#[test]
fn test_list_member_appends_when_merging() {
    let mut journal = Journal::default();
    let mut planet = Planet {
        moons: vec![Ring::default()],
        ..Planet::default()
    };
    let node = ConfigNode::new("Planet")
        .with_value("name", "Kerbin")
        .with_node(ConfigNode::new("Moon").with_value("inner", "5"))
        .with_node(ConfigNode::new("Moon").with_value("inner", "6"));
    bind(&node, &mut planet, &mut journal).unwrap();
    let inner: Vec<f64> = planet.moons.iter().map(|m| m.inner).collect();
    assert_eq!(inner, [0.0, 5.0, 6.0]);
}

#[test]
fn test_conversion_error_carries_member_path() {
    let node = ConfigNode::new("Planet")
        .with_value("name", "Kerbin")
        .with_node(ConfigNode::new("Atmosphere").with_value("pressure", "thick"));
    let err = create::<Planet>(&node, &mut Journal::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Atmosphere: pressure: expected a number, found `thick`"
    );
    assert!(matches!(
        err.root_cause(),
        BindError::Convert(ConvertError::Invalid { .. })
    ));
}

#[test]
fn test_collection_error_names_element() {
    let node = ConfigNode::new("Planet").with_value("name", "Jool").with_node(
        ConfigNode::new("Rings").with_node(ConfigNode::new("Dust").with_value("inner", "x")),
    );
    let err = create::<Planet>(&node, &mut Journal::default()).unwrap_err();
    assert!(err.to_string().starts_with("Rings: Dust[0]: inner:"), "{err}");
}

#[test]
fn test_strict_context_rejects_unknown_entries() {
    let node = planet_node().with_value("colour", "blue");
    let mut lenient = Journal::default();
    assert!(create::<Planet>(&node, &mut lenient).is_ok());

    let mut strict = Journal {
        strict: true,
        ..Journal::default()
    };
    let err = create::<Planet>(&node, &mut strict).unwrap_err();
    assert!(matches!(err, BindError::UnknownEntry { target: "Planet", .. }));
}

#[test]
fn test_lenient_schema_ignores_strict_context() {
    let node = ConfigNode::new("Planet").with_value("name", "Jool").with_node(
        ConfigNode::new("Rings")
            .with_node(ConfigNode::new("Dust").with_value("texture", "dust.png")),
    );
    let mut strict = Journal {
        strict: true,
        ..Journal::default()
    };
    assert!(create::<Planet>(&node, &mut strict).is_ok());
}

#[test]
fn test_shape_mismatch_is_reported() {
    let node = ConfigNode::new("Planet")
        .with_value("name", "Kerbin")
        .with_value("Atmosphere", "yes");
    let err = create::<Planet>(&node, &mut Journal::default()).unwrap_err();
    assert!(matches!(err, BindError::ExpectedNode { ref key } if key == "Atmosphere"));

    let node = ConfigNode::new("Planet").with_node(ConfigNode::new("name"));
    let err = create::<Planet>(&node, &mut Journal::default()).unwrap_err();
    assert!(matches!(err, BindError::ExpectedValue { ref key } if key == "name"));
}

#[test]
fn test_alias_join_and_repeated_values() {
    let node = ConfigNode::new("Planet")
        .with_value("name", "Eve")
        .with_value("r", "700000")
        .with_value("description", "purple")
        .with_value("description", "and heavy")
        .with_value("tag", "a")
        .with_value("tag", "b");
    let planet: Planet = create(&node, &mut Journal::default()).unwrap();
    assert_eq!(planet.radius, 700000.0);
    assert_eq!(planet.description, "purple and heavy");
    assert_eq!(planet.tags, ["a", "b"]);
}

#[test]
fn test_raw_and_curve_nodes() {
    let node = ConfigNode::new("Planet")
        .with_value("name", "Duna")
        .with_node(ConfigNode::new("Notes").with_value("anything", "goes"))
        .with_node(
            ConfigNode::new("Curve")
                .with_value("key", "0 1")
                .with_value("key", "1 0"),
        );
    let planet: Planet = create(&node, &mut Journal::default()).unwrap();
    assert_eq!(planet.notes.unwrap().value("anything"), Some("goes"));
    assert_eq!(planet.curve.unwrap().keys().len(), 2);
}

#[test]
fn test_post_apply_rejection_propagates() {
    let node = ConfigNode::new("Planet")
        .with_value("name", "Bad")
        .with_value("radius", "-1");
    let err = create::<Planet>(&node, &mut Journal::default()).unwrap_err();
    assert_eq!(err.to_string(), "Bad has a negative radius");
}
