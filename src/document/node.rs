// src/document/node.rs

use crate::utils::geometry::{format_coord, Bounds, Vec3};

/// A block in a VMF document: `name { "key" "value" ... child { ... } }`.
///
/// Property order is preserved and keys may repeat (entity `connections`
/// blocks routinely carry several outputs with the same key).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node {
    pub name: String,
    pub properties: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Node {
            name: name.into(),
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style property append.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push((key.into(), value.into()));
        self
    }

    /// Builder-style child append.
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Overwrites the first value under `key`, or appends it.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.properties.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.properties.push((key.to_string(), value)),
        }
    }

    pub fn id(&self) -> Option<u64> {
        self.get("id").and_then(|id| id.trim().parse().ok())
    }

    pub fn classname(&self) -> Option<&str> {
        self.get("classname")
    }

    pub fn has_classname(&self, classname: &str) -> bool {
        self.classname() == Some(classname)
    }

    pub fn targetname(&self) -> Option<&str> {
        self.get("targetname")
    }

    pub fn origin(&self) -> Option<Vec3> {
        self.get("origin").and_then(Vec3::parse)
    }

    pub fn is_solid(&self) -> bool {
        self.name == "solid"
    }

    /// The three points of a side's `plane` property.
    pub fn plane_points(&self) -> Option<[Vec3; 3]> {
        self.get("plane").and_then(parse_plane)
    }

    /// Every descendant matching `pred`, in document order.
    pub fn find_recurse<F>(&self, pred: F) -> Vec<&Node>
    where
        F: Fn(&Node) -> bool,
    {
        let mut found = Vec::new();
        self.collect_matching(&pred, &mut found);
        found
    }

    fn collect_matching<'a, F>(&'a self, pred: &F, found: &mut Vec<&'a Node>)
    where
        F: Fn(&Node) -> bool,
    {
        for child in &self.children {
            if pred(child) {
                found.push(child);
            }
            child.collect_matching(pred, found);
        }
    }

    /// First descendant matching `pred`, in document order.
    pub fn find_first<F>(&self, pred: F) -> Option<&Node>
    where
        F: Fn(&Node) -> bool,
    {
        fn walk<'a, F: Fn(&Node) -> bool>(node: &'a Node, pred: &F) -> Option<&'a Node> {
            for child in &node.children {
                if pred(child) {
                    return Some(child);
                }
                if let Some(found) = walk(child, pred) {
                    return Some(found);
                }
            }
            None
        }
        walk(self, &pred)
    }

    /// Mutable access to every descendant matching `pred`, in document order.
    /// Matching nodes are not searched further.
    pub fn for_each_matching_mut<F, G>(&mut self, pred: &F, visit: &mut G)
    where
        F: Fn(&Node) -> bool,
        G: FnMut(&mut Node),
    {
        for child in &mut self.children {
            if pred(child) {
                visit(child);
            } else {
                child.for_each_matching_mut(pred, visit);
            }
        }
    }

    /// Removes every descendant matching `pred` (with its subtree) and
    /// returns how many nodes were removed.
    pub fn delete_recurse<F>(&mut self, pred: F) -> usize
    where
        F: Fn(&Node) -> bool,
    {
        self.delete_matching(&pred)
    }

    fn delete_matching<F>(&mut self, pred: &F) -> usize
    where
        F: Fn(&Node) -> bool,
    {
        let before = self.children.len();
        self.children.retain(|child| !pred(child));
        let mut removed = before - self.children.len();
        for child in &mut self.children {
            removed += child.delete_matching(pred);
        }
        removed
    }

    /// Moves all geometry below this node by `vector`.
    ///
    /// Texture axes are shifted along with the planes so world-aligned
    /// textures stay locked to the brushes.
    pub fn translate_recurse(&mut self, vector: Vec3) {
        for (key, value) in &mut self.properties {
            let translated = match key.as_str() {
                "plane" => parse_plane(value).map(|points| format_plane(&points.map(|p| p + vector))),
                "origin" => Vec3::parse(value).map(|origin| (origin + vector).to_string()),
                "startposition" => parse_bracketed(value)
                    .map(|position| format!("[{}]", position + vector)),
                "uaxis" | "vaxis" => shift_texture_axis(value, vector),
                _ => None,
            };
            if let Some(translated) = translated {
                *value = translated;
            }
        }
        for child in &mut self.children {
            child.translate_recurse(vector);
        }
    }

    /// Bounds of every `plane` point below (and on) this node.
    pub fn bounds_recurse(&self) -> Option<Bounds> {
        let mut bounds = Bounds::new_empty();
        self.expand_bounds(&mut bounds);
        (!bounds.is_empty()).then_some(bounds)
    }

    fn expand_bounds(&self, bounds: &mut Bounds) {
        if let Some(points) = self.plane_points() {
            for point in &points {
                bounds.expand_point(point);
            }
        }
        for child in &self.children {
            child.expand_bounds(bounds);
        }
    }

    /// Largest `id` on this node or below, 0 if there is none.
    pub fn max_id_recurse(&self) -> u64 {
        self.children
            .iter()
            .map(Node::max_id_recurse)
            .fold(self.id().unwrap_or(0), u64::max)
    }

    /// Adds `offset` to every `id` on this node and below.
    pub fn increase_id_recurse(&mut self, offset: u64) {
        for (key, value) in &mut self.properties {
            if key == "id" {
                if let Ok(id) = value.trim().parse::<u64>() {
                    *value = (id + offset).to_string();
                }
            }
        }
        for child in &mut self.children {
            child.increase_id_recurse(offset);
        }
    }
}

/// Parses `(x y z) (x y z) (x y z)`.
pub fn parse_plane(text: &str) -> Option<[Vec3; 3]> {
    let numbers: Vec<f64> = text
        .split(|c: char| c == '(' || c == ')' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    if numbers.len() != 9 {
        return None;
    }
    Some([
        Vec3::new(numbers[0], numbers[1], numbers[2]),
        Vec3::new(numbers[3], numbers[4], numbers[5]),
        Vec3::new(numbers[6], numbers[7], numbers[8]),
    ])
}

pub fn format_plane(points: &[Vec3]) -> String {
    points
        .iter()
        .map(|p| format!("({})", p))
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_bracketed(text: &str) -> Option<Vec3> {
    Vec3::parse(text.trim().strip_prefix('[')?.strip_suffix(']')?)
}

/// Rewrites `[ux uy uz shift] scale` so the texture follows a translation.
fn shift_texture_axis(text: &str, vector: Vec3) -> Option<String> {
    let (inner, scale) = text.trim().strip_prefix('[')?.split_once(']')?;
    let values: Vec<f64> = inner
        .split_whitespace()
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    let scale_value: f64 = scale.trim().parse().ok()?;
    if values.len() != 4 || scale_value == 0.0 {
        return None;
    }
    let axis = Vec3::new(values[0], values[1], values[2]);
    let shift = values[3] - axis.dot(&vector) / scale_value;
    Some(format!(
        "[{} {} {} {}] {}",
        format_coord(values[0]),
        format_coord(values[1]),
        format_coord(values[2]),
        format_coord(shift),
        scale.trim()
    ))
}
