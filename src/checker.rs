use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::ops::Deref;

use log::{debug, trace};
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::{
    ast::{CodeRange, Document, ObjectTypeDefinition, Type, TypeRef, RESERVED_TYPE_NAMES},
    reporter::{ErrorReporter, ReportedError},
    suggest::did_you_mean,
};

/// Name of the definition every schema is rooted at.
pub const ROOT_TYPE_NAME: &str = "Storage";

/// A definition together with its computed classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckedDefinition<'a> {
    pub definition: &'a ObjectTypeDefinition,
    /// No path from the root reaches this definition through a live wrapper.
    pub is_static: bool,
}

impl Deref for CheckedDefinition<'_> {
    type Target = ObjectTypeDefinition;

    fn deref(&self) -> &Self::Target {
        self.definition
    }
}

impl Serialize for CheckedDefinition<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("ObjectTypeDefinition", 5)?;
        state.serialize_field("_kind", "ObjectTypeDefinition")?;
        state.serialize_field("name", &self.definition.name)?;
        state.serialize_field("isStatic", &self.is_static)?;
        state.serialize_field("leadingComment", &self.definition.leading_comment)?;
        state.serialize_field("fields", &self.definition.fields)?;
        state.end()
    }
}

/// Result of a successful [`check`].
///
/// Borrows the checked [`Document`]; classifications live in this value only,
/// the document itself is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CheckedDocument<'a> {
    pub root: CheckedDefinition<'a>,
    pub ast: &'a Document,
    /// Every definition but the root, in declaration order.
    pub definitions: Vec<CheckedDefinition<'a>>,
    #[serde(skip)]
    table: HashMap<&'a str, CheckedDefinition<'a>>,
}

impl<'a> CheckedDocument<'a> {
    /// Resolves a reference taken from this document.
    ///
    /// Panics if the name is unknown, which can only happen for a reference
    /// that belongs to some other document.
    pub fn get_definition(&self, type_ref: &TypeRef) -> CheckedDefinition<'a> {
        match self.try_get_definition(type_ref) {
            Some(def) => def,
            None => panic!(
                "get_definition: `{}` is not defined in the checked document",
                type_ref.ref_.name
            ),
        }
    }

    pub fn try_get_definition(&self, type_ref: &TypeRef) -> Option<CheckedDefinition<'a>> {
        self.table.get(type_ref.ref_.name.as_str()).copied()
    }
}

/// Validates a parsed document and resolves it into a [`CheckedDocument`].
///
/// All passes run before failing, so the returned error carries every
/// problem found; only classification and cycle detection are skipped
/// through references that could not be resolved.
pub fn check<'a>(
    document: &'a Document,
    reporter: &mut ErrorReporter,
) -> Result<CheckedDocument<'a>, ReportedError> {
    let mut checker = Checker::new(document, reporter);
    checker.check_names();
    let root = checker.find_root();
    checker.check_references();
    let classes = root.map(|root| checker.classify(root));
    if let Some(classes) = &classes {
        checker.check_static_cycles(classes);
    }
    let table = checker.table;
    reporter.raise_if_reported()?;

    let (Some(root), Some(classes)) = (root, classes) else {
        unreachable!("a missing root is always reported");
    };
    let table = table
        .into_iter()
        .map(|(name, definition)| {
            let is_static = classes.is_static(definition, root);
            (name, CheckedDefinition { definition, is_static })
        })
        .collect::<HashMap<_, _>>();
    let definitions = document
        .object_types()
        .filter(|def| !std::ptr::eq(*def, root))
        .map(|def| table[def.name.name.as_str()])
        .collect::<Vec<_>>();
    debug!(
        "checked {} definition(s), {} static",
        definitions.len() + 1,
        definitions.iter().filter(|def| def.is_static).count()
    );
    Ok(CheckedDocument {
        root: table[ROOT_TYPE_NAME],
        ast: document,
        definitions,
        table,
    })
}

struct Checker<'a, 'r> {
    document: &'a Document,
    reporter: &'r mut ErrorReporter,
    /// First definition of each name.
    table: HashMap<&'a str, &'a ObjectTypeDefinition>,
}

/// Reachability of each definition from the root: `true` once some path to
/// it has crossed a live wrapper. Unreached definitions are absent.
#[derive(Debug, Clone, Default)]
struct Classes<'a> {
    crossed_live: HashMap<&'a str, bool>,
}

impl<'a> Classes<'a> {
    fn is_static(&self, def: &ObjectTypeDefinition, root: &ObjectTypeDefinition) -> bool {
        !std::ptr::eq(def, root)
            && !self
                .crossed_live
                .get(def.name.name.as_str())
                .copied()
                .unwrap_or(false)
    }
}

impl<'a, 'r> Checker<'a, 'r> {
    fn new(document: &'a Document, reporter: &'r mut ErrorReporter) -> Self {
        Self {
            document,
            reporter,
            table: HashMap::new(),
        }
    }

    fn check_names(&mut self) {
        for def in self.document.object_types() {
            let name = def.name.name.as_str();
            let lowercase = name.to_ascii_lowercase();
            if RESERVED_TYPE_NAMES.contains(&lowercase.as_str()) {
                self.reporter.report(
                    def.name.range,
                    format!("type name `{}` is reserved for a built-in type", name),
                );
            }
            match self.table.entry(name) {
                Entry::Occupied(_) => {
                    self.reporter.report(
                        def.name.range,
                        format!("a type named `{}` is already defined", name),
                    );
                }
                Entry::Vacant(entry) => {
                    entry.insert(def);
                }
            }

            let mut field_names = HashSet::new();
            for field in &def.fields {
                if !field_names.insert(field.name.name.as_str()) {
                    self.reporter.report(
                        field.name.range,
                        format!(
                            "field `{}` is already defined in type `{}`",
                            field.name.name, name
                        ),
                    );
                }
            }
        }
    }

    fn find_root(&mut self) -> Option<&'a ObjectTypeDefinition> {
        let root = self.table.get(ROOT_TYPE_NAME).copied();
        if root.is_none() {
            self.reporter.report(
                CodeRange::empty_at(self.document.range.start),
                format!(
                    "missing root type `{}`, every schema needs a `type {} {{ ... }}` definition",
                    ROOT_TYPE_NAME, ROOT_TYPE_NAME
                ),
            );
        }
        root
    }

    fn check_references(&mut self) {
        for def in self.document.object_types() {
            for field in &def.fields {
                self.check_type(&field.type_);
            }
        }
    }

    fn check_type(&mut self, type_: &'a Type) {
        match type_ {
            Type::Boolean(_)
            | Type::Number(_)
            | Type::String(_)
            | Type::Null(_)
            | Type::StringLiteral(_)
            | Type::NumberLiteral(_)
            | Type::BooleanLiteral(_) => {}
            Type::Ref(type_ref) => {
                let name = type_ref.ref_.name.as_str();
                if !self.table.contains_key(name) {
                    let message = match did_you_mean(name, self.table.keys().copied()) {
                        Some(hint) => format!("unknown type `{}`, {}", name, hint),
                        None => format!("unknown type `{}`", name),
                    };
                    self.reporter.report(type_ref.ref_.range, message);
                }
            }
            Type::Array(array) => self.check_type(&array.of_type),
            Type::LiveList(list) => self.check_type(&list.of_type),
            Type::LiveMap(map) => {
                if !matches!(*map.key_type, Type::String(_)) {
                    self.reporter.report(
                        *map.key_type.range(),
                        "`LiveMap` keys must be of type `string`",
                    );
                }
                self.check_type(&map.key_type);
                self.check_type(&map.value_type);
            }
            Type::Union(union) => {
                for member in &union.members {
                    self.check_type(member);
                }
            }
        }
    }

    /// Propagates "crossed a live wrapper" from the root along every
    /// resolvable reference. A definition is revisited when it gets upgraded
    /// from plain to live, so the result does not depend on visiting order.
    fn classify(&self, root: &'a ObjectTypeDefinition) -> Classes<'a> {
        let mut classes = Classes::default();
        classes.crossed_live.insert(root.name.name.as_str(), false);
        let mut worklist = vec![root];
        while let Some(def) = worklist.pop() {
            let crossed = classes.crossed_live[def.name.name.as_str()];
            for field in &def.fields {
                for_each_ref(&field.type_, false, &mut |type_ref, live_edge| {
                    let Some(&target) = self.table.get(type_ref.ref_.name.as_str()) else {
                        return;
                    };
                    // The root stays the live origin whatever points back at it.
                    if std::ptr::eq(target, root) {
                        return;
                    }
                    let reached_live = crossed || live_edge;
                    let name = target.name.name.as_str();
                    let changed = match classes.crossed_live.get(name) {
                        None => true,
                        Some(&was_live) => reached_live && !was_live,
                    };
                    if changed {
                        trace!(
                            "{} reached from {}.{} as {}",
                            name,
                            def.name.name,
                            field.name.name,
                            if reached_live { "live" } else { "static" }
                        );
                        classes.crossed_live.insert(name, reached_live);
                        worklist.push(target);
                    }
                });
            }
        }
        classes
    }

    /// Plain data must be finite: static definitions may not reach
    /// themselves through plain references only.
    fn check_static_cycles(&mut self, classes: &Classes<'a>) {
        let Some(&root) = self.table.get(ROOT_TYPE_NAME) else {
            return;
        };
        let nodes = self
            .document
            .object_types()
            .filter(|def| {
                self.table
                    .get(def.name.name.as_str())
                    .is_some_and(|first| std::ptr::eq(*first, *def))
                    && classes.is_static(def, root)
            })
            .collect::<Vec<_>>();
        let index_of = nodes
            .iter()
            .enumerate()
            .map(|(i, def)| (def.name.name.as_str(), i))
            .collect::<HashMap<_, _>>();
        let edges = nodes
            .iter()
            .map(|def| {
                let mut targets = Vec::new();
                for field in &def.fields {
                    for_each_ref(&field.type_, false, &mut |type_ref, live_edge| {
                        if live_edge {
                            return;
                        }
                        if let Some(&j) = index_of.get(type_ref.ref_.name.as_str()) {
                            targets.push(j);
                        }
                    });
                }
                targets
            })
            .collect::<Vec<_>>();

        let mut components = strongly_connected_components(&edges);
        for component in &mut components {
            component.sort_unstable();
        }
        components.sort_unstable_by_key(|component| component[0]);
        for component in components {
            let first = component[0];
            let is_cycle = component.len() > 1 || edges[first].contains(&first);
            if !is_cycle {
                continue;
            }
            let members = component
                .iter()
                .map(|&i| format!("`{}`", nodes[i].name.name))
                .collect::<Vec<_>>()
                .join(", ");
            self.reporter.report(
                nodes[first].name.range,
                format!(
                    "static types cannot reference themselves in a cycle ({}), \
                     wrap one of the references in `LiveObject<...>` or `LiveList<...>`",
                    members
                ),
            );
        }
    }
}

/// Calls `f` on every reference inside `type_`, telling whether the
/// reference sits behind a live wrapper.
fn for_each_ref<'a, F>(type_: &'a Type, in_live_container: bool, f: &mut F)
where
    F: FnMut(&'a TypeRef, bool),
{
    match type_ {
        Type::Ref(type_ref) => f(type_ref, in_live_container || type_ref.as_live_object),
        Type::Array(array) => for_each_ref(&array.of_type, in_live_container, f),
        Type::LiveList(list) => for_each_ref(&list.of_type, true, f),
        Type::LiveMap(map) => {
            for_each_ref(&map.key_type, true, f);
            for_each_ref(&map.value_type, true, f);
        }
        Type::Union(union) => {
            for member in &union.members {
                for_each_ref(member, in_live_container, f);
            }
        }
        Type::Boolean(_)
        | Type::Number(_)
        | Type::String(_)
        | Type::Null(_)
        | Type::StringLiteral(_)
        | Type::NumberLiteral(_)
        | Type::BooleanLiteral(_) => {}
    }
}

/// Tarjan's algorithm over an adjacency list, driven by an explicit stack so
/// that long chains of definitions cannot exhaust the call stack.
fn strongly_connected_components(edges: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let n = edges.len();
    let mut next_index = 0usize;
    let mut index = vec![None; n];
    let mut lowlink = vec![0; n];
    let mut on_stack = vec![false; n];
    let mut stack = Vec::new();
    let mut components = Vec::new();
    // (node, position of the next outgoing edge to follow)
    let mut work: Vec<(usize, usize)> = Vec::new();

    for start in 0..n {
        if index[start].is_some() {
            continue;
        }
        work.push((start, 0));
        while let Some((v, edge_pos)) = work.pop() {
            if edge_pos == 0 {
                index[v] = Some(next_index);
                lowlink[v] = next_index;
                next_index += 1;
                stack.push(v);
                on_stack[v] = true;
            }

            if let Some(&w) = edges[v].get(edge_pos) {
                work.push((v, edge_pos + 1));
                match index[w] {
                    None => work.push((w, 0)),
                    Some(w_index) if on_stack[w] => {
                        lowlink[v] = lowlink[v].min(w_index);
                    }
                    Some(_) => {}
                }
                continue;
            }

            if Some(lowlink[v]) == index[v] {
                let mut component = Vec::new();
                while let Some(w) = stack.pop() {
                    on_stack[w] = false;
                    component.push(w);
                    if w == v {
                        break;
                    }
                }
                components.push(component);
            }
            if let Some(&(parent, _)) = work.last() {
                lowlink[parent] = lowlink[parent].min(lowlink[v]);
            }
        }
    }
    components
}
