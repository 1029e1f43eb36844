//! Static member tables describing how a target type answers to configuration keys.

use std::borrow::Cow;

use crate::bind::{Bindable, bind};
use crate::convert::{NodeParsable, Parsable};
use crate::error::BindError;
use crate::node::ConfigNode;

/// What a member does when it matches a node and already holds a value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// Construct a fresh value and bind into it.
    #[default]
    Replace,
    /// Bind into the existing value if there is one.
    Merge,
}

/// When a member is bound relative to the target's `apply` hook.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// Before `apply`, ahead of every ordinary member.
    PreApply,
    /// After `apply`.
    #[default]
    Ordinary,
}

type ValueFn<T, C> = Box<dyn Fn(&mut T, &str, &mut C) -> Result<(), BindError> + Send + Sync>;
type NodeFn<T, C> =
    Box<dyn Fn(&mut T, &ConfigNode, &mut C, MergePolicy) -> Result<(), BindError> + Send + Sync>;
type NodesFn<T, C> = Box<
    dyn Fn(&mut T, &[&ConfigNode], &mut C, MergePolicy) -> Result<(), BindError> + Send + Sync,
>;
type PresentFn<T> = Box<dyn Fn(&mut T) -> bool + Send + Sync>;

pub(crate) enum Shape<T, C> {
    /// First value under the key, or all values joined with a separator.
    Value {
        bind: ValueFn<T, C>,
        join: Option<&'static str>,
    },
    /// Every value under the key, one call each.
    Repeated { bind: ValueFn<T, C> },
    /// First child node under the key.
    Node { bind: NodeFn<T, C> },
    /// Every child node under the key, in one call.
    Nodes { bind: NodesFn<T, C> },
}

/// One bindable member of a target type.
pub struct Member<T, C> {
    pub(crate) keys: Vec<&'static str>,
    pub(crate) required: bool,
    pub(crate) merge: MergePolicy,
    pub(crate) phase: Phase,
    pub(crate) shape: Shape<T, C>,
    pub(crate) present: Option<PresentFn<T>>,
}

impl<T: 'static, C: 'static> Member<T, C> {
    fn with_shape(key: &'static str, shape: Shape<T, C>) -> Self {
        Self {
            keys: vec![key],
            required: false,
            merge: MergePolicy::Replace,
            phase: Phase::Ordinary,
            shape,
            present: None,
        }
    }

    /// A value parsed with [`Parsable`] and stored in a field.
    pub fn field<V: Parsable + 'static>(key: &'static str, slot: fn(&mut T) -> &mut V) -> Self {
        Self::with_shape(
            key,
            Shape::Value {
                bind: Box::new(move |target: &mut T, literal: &str, _: &mut C| {
                    *slot(target) = V::parse(literal)?;
                    Ok(())
                }),
                join: None,
            },
        )
    }

    /// A value parsed with [`Parsable`] and stored in an optional field.
    pub fn optional<V: Parsable + 'static>(
        key: &'static str,
        slot: fn(&mut T) -> &mut Option<V>,
    ) -> Self {
        Self::with_shape(
            key,
            Shape::Value {
                bind: Box::new(move |target: &mut T, literal: &str, _: &mut C| {
                    *slot(target) = Some(V::parse(literal)?);
                    Ok(())
                }),
                join: None,
            },
        )
    }

    /// A parsed value handed to a setter that may consult the context.
    pub fn setter<V: Parsable + 'static>(
        key: &'static str,
        set: fn(&mut T, V, &mut C) -> Result<(), BindError>,
    ) -> Self {
        Self::with_shape(
            key,
            Shape::Value {
                bind: Box::new(move |target: &mut T, literal: &str, ctx: &mut C| {
                    set(target, V::parse(literal)?, ctx)
                }),
                join: None,
            },
        )
    }

    /// Every occurrence of a repeated key, parsed and handed to `push` in order.
    pub fn each<V: Parsable + 'static>(
        key: &'static str,
        push: fn(&mut T, V, &mut C) -> Result<(), BindError>,
    ) -> Self {
        Self::with_shape(
            key,
            Shape::Repeated {
                bind: Box::new(move |target: &mut T, literal: &str, ctx: &mut C| {
                    push(target, V::parse(literal)?, ctx)
                }),
            },
        )
    }

    /// A node-shaped value such as a curve.
    pub fn node_value<V: NodeParsable + 'static>(
        key: &'static str,
        slot: fn(&mut T) -> &mut Option<V>,
    ) -> Self {
        Self::with_shape(
            key,
            Shape::Node {
                bind: Box::new(move |target: &mut T, node: &ConfigNode, _: &mut C, _: MergePolicy| {
                    *slot(target) = Some(V::from_node(node)?);
                    Ok(())
                }),
            },
        )
    }

    /// A child node kept verbatim for a collaborator to interpret.
    pub fn raw_node(key: &'static str, slot: fn(&mut T) -> &mut Option<ConfigNode>) -> Self {
        let mut member = Self::with_shape(
            key,
            Shape::Node {
                bind: Box::new(move |target: &mut T, node: &ConfigNode, _: &mut C, _: MergePolicy| {
                    *slot(target) = Some(node.clone());
                    Ok(())
                }),
            },
        );
        member.present = Some(Box::new(move |target: &mut T| slot(target).is_some()));
        member
    }

    /// A nested target stored in an optional field.
    ///
    /// With [`MergePolicy::Merge`] an existing value is bound in place,
    /// otherwise a default value is constructed, bound, and then stored.
    pub fn child<U>(key: &'static str, slot: fn(&mut T) -> &mut Option<U>) -> Self
    where
        U: Bindable<Context = C> + Default,
    {
        let mut member = Self::with_shape(
            key,
            Shape::Node {
                bind: Box::new(
                    move |target: &mut T, node: &ConfigNode, ctx: &mut C, policy: MergePolicy| {
                        let current = slot(target);
                        if policy == MergePolicy::Merge
                            && let Some(existing) = current.as_mut()
                        {
                            return bind(node, existing, ctx);
                        }
                        let mut fresh = U::default();
                        bind(node, &mut fresh, ctx)?;
                        *current = Some(fresh);
                        Ok(())
                    },
                ),
            },
        );
        member.present = Some(Box::new(move |target: &mut T| slot(target).is_some()));
        member
    }

    /// A nested target that always exists on the parent.
    ///
    /// With [`MergePolicy::Replace`] the field is reset to its default first.
    pub fn section<U>(key: &'static str, slot: fn(&mut T) -> &mut U) -> Self
    where
        U: Bindable<Context = C> + Default,
    {
        let mut member = Self::with_shape(
            key,
            Shape::Node {
                bind: Box::new(
                    move |target: &mut T, node: &ConfigNode, ctx: &mut C, policy: MergePolicy| {
                        let current = slot(target);
                        if policy == MergePolicy::Replace {
                            *current = U::default();
                        }
                        bind(node, current, ctx)
                    },
                ),
            },
        );
        member.present = Some(Box::new(|_: &mut T| true));
        member
    }

    /// A collection whose elements are the children of the node under `key`.
    ///
    /// An empty node yields an empty collection. With [`MergePolicy::Merge`]
    /// new elements are appended to the existing ones.
    pub fn collection<U>(key: &'static str, slot: fn(&mut T) -> &mut Vec<U>) -> Self
    where
        U: Bindable<Context = C> + Default,
    {
        Self::with_shape(
            key,
            Shape::Node {
                bind: Box::new(
                    move |target: &mut T, node: &ConfigNode, ctx: &mut C, policy: MergePolicy| {
                        let items = bind_elements::<U>(node.nodes().iter(), ctx)?;
                        let list = slot(target);
                        if policy == MergePolicy::Replace {
                            list.clear();
                        }
                        list.extend(items);
                        Ok(())
                    },
                ),
            },
        )
    }

    /// A collection with one element per sibling node called `key`.
    pub fn list<U>(key: &'static str, slot: fn(&mut T) -> &mut Vec<U>) -> Self
    where
        U: Bindable<Context = C> + Default,
    {
        Self::with_shape(
            key,
            Shape::Nodes {
                bind: Box::new(
                    move |target: &mut T,
                          nodes: &[&ConfigNode],
                          ctx: &mut C,
                          policy: MergePolicy| {
                        let items = bind_elements::<U>(nodes.iter().copied(), ctx)?;
                        let list = slot(target);
                        if policy == MergePolicy::Replace {
                            list.clear();
                        }
                        list.extend(items);
                        Ok(())
                    },
                ),
            },
        )
    }

    /// Also answer to `key`. Earlier keys win when several are present.
    pub fn alias(mut self, key: &'static str) -> Self {
        self.keys.push(key);
        self
    }

    /// Fail binding when no entry matches.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Bind into existing values instead of replacing them.
    pub fn merge(mut self) -> Self {
        self.merge = MergePolicy::Merge;
        self
    }

    /// Bind before the target's `apply` hook.
    pub fn pre_apply(mut self) -> Self {
        self.phase = Phase::PreApply;
        self
    }

    /// Join every value under the key with `separator` instead of taking the first.
    pub fn join_all(mut self, separator: &'static str) -> Self {
        if let Shape::Value { join, .. } = &mut self.shape {
            *join = Some(separator);
        }
        self
    }

    /// Keys this member answers to.
    pub fn keys(&self) -> &[&'static str] {
        &self.keys
    }

    /// Binds this member from `node`, or checks that it may be absent.
    pub(crate) fn bind(
        &self,
        target_name: &'static str,
        node: &ConfigNode,
        target: &mut T,
        ctx: &mut C,
    ) -> Result<(), BindError> {
        match &self.shape {
            Shape::Value { bind, join } => {
                let Some(key) = self.keys.iter().copied().find(|k| node.has_value(k)) else {
                    return self.absent(target_name, node, target, true);
                };
                let literal = match join {
                    Some(separator) => {
                        Cow::Owned(node.values_of(key).collect::<Vec<_>>().join(separator))
                    }
                    None => Cow::Borrowed(node.value(key).unwrap_or_default()),
                };
                bind(target, &literal, ctx).map_err(|e| e.at(key))
            }
            Shape::Repeated { bind } => {
                let Some(key) = self.keys.iter().copied().find(|k| node.has_value(k)) else {
                    return self.absent(target_name, node, target, true);
                };
                for literal in node.values_of(key) {
                    bind(target, literal, ctx).map_err(|e| e.at(key))?;
                }
                Ok(())
            }
            Shape::Node { bind } => {
                let Some((key, child)) = self
                    .keys
                    .iter()
                    .find_map(|k| node.node(k).map(|child| (*k, child)))
                else {
                    return self.absent(target_name, node, target, false);
                };
                bind(target, child, ctx, self.merge).map_err(|e| e.at(key))
            }
            Shape::Nodes { bind } => {
                let Some(key) = self.keys.iter().copied().find(|k| node.has_node(k)) else {
                    return self.absent(target_name, node, target, false);
                };
                let matches: Vec<&ConfigNode> = node.nodes_named(key).collect();
                bind(target, &matches, ctx, self.merge).map_err(|e| e.at(key))
            }
        }
    }

    fn absent(
        &self,
        target_name: &'static str,
        node: &ConfigNode,
        target: &mut T,
        wants_value: bool,
    ) -> Result<(), BindError> {
        for key in &self.keys {
            if wants_value && node.has_node(key) {
                return Err(BindError::ExpectedValue {
                    key: (*key).to_owned(),
                });
            }
            if !wants_value && node.has_value(key) {
                return Err(BindError::ExpectedNode {
                    key: (*key).to_owned(),
                });
            }
        }
        let satisfied = self.merge == MergePolicy::Merge
            && self.present.as_ref().is_some_and(|present| present(target));
        if self.required && !satisfied {
            return Err(BindError::MissingRequired {
                target: target_name,
                key: self.keys.first().copied().unwrap_or_default(),
            });
        }
        Ok(())
    }
}

fn bind_elements<'a, U>(
    nodes: impl Iterator<Item = &'a ConfigNode>,
    ctx: &mut U::Context,
) -> Result<Vec<U>, BindError>
where
    U: Bindable + Default,
{
    let mut items = Vec::new();
    for (index, node) in nodes.enumerate() {
        let mut item = U::default();
        bind(node, &mut item, ctx).map_err(|e| e.at(format!("{}[{index}]", node.name())))?;
        items.push(item);
    }
    Ok(items)
}

/// The static member table of a target type.
///
/// Built once per type, usually inside a `LazyLock`, and returned from
/// [`Bindable::schema`].
pub struct Schema<T, C> {
    name: &'static str,
    strict: Option<bool>,
    members: Vec<Member<T, C>>,
}

impl<T: 'static, C: 'static> Schema<T, C> {
    /// Creates an empty table for a target called `name` in diagnostics.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            strict: None,
            members: Vec::new(),
        }
    }

    /// Appends a member. Members bind in the order they are added.
    pub fn member(mut self, member: Member<T, C>) -> Self {
        self.members.push(member);
        self
    }

    /// Always reject unmatched entries.
    pub fn strict(mut self) -> Self {
        self.strict = Some(true);
        self
    }

    /// Never reject unmatched entries, even when the context asks for strictness.
    pub fn lenient(mut self) -> Self {
        self.strict = Some(false);
        self
    }

    /// Name used in diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Members in binding order.
    pub fn members(&self) -> &[Member<T, C>] {
        &self.members
    }

    pub(crate) fn strictness(&self) -> Option<bool> {
        self.strict
    }

    /// Returns `true` if some member answers to `key`.
    pub fn accepts(&self, key: &str) -> bool {
        self.members.iter().any(|m| m.keys.contains(&key))
    }

    /// First value key or child name of `node` that no member answers to.
    pub fn first_unmatched<'a>(&self, node: &'a ConfigNode) -> Option<&'a str> {
        node.values()
            .map(|(key, _)| key)
            .chain(node.nodes().iter().map(ConfigNode::name))
            .find(|key| !self.accepts(key))
    }
}
