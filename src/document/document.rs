// src/document/document.rs

use std::fs;
use std::path::Path;

use crate::document::Node;
use crate::error::{GenError, Result};
use crate::utils::geometry::{Bounds, Vec3};

/// Top-level blocks that only hold editor state; a merged map keeps its own.
pub const EDITOR_BLOCKS: [&str; 5] = ["versioninfo", "visgroups", "viewsettings", "cameras", "cordon"];

/// A whole VMF file. The root node is anonymous; its children are the
/// top-level blocks (`versioninfo`, `world`, `entity`, `cameras`, ...).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub root: Node,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Quoted(String),
    Open,
    Close,
}

/// Splits VMF text into tokens, remembering the line each one starts on.
fn tokenize(text: &str) -> Result<Vec<(Token, usize)>> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    let mut line = 1;

    while let Some(&c) = chars.peek() {
        match c {
            '\n' => {
                line += 1;
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            '{' => {
                tokens.push((Token::Open, line));
                chars.next();
            }
            '}' => {
                tokens.push((Token::Close, line));
                chars.next();
            }
            '"' => {
                let start = line;
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some(ch) => {
                            if ch == '\n' {
                                line += 1;
                            }
                            value.push(ch);
                        }
                        None => {
                            return Err(GenError::Parse {
                                line: start,
                                message: "unterminated string".into(),
                            })
                        }
                    }
                }
                tokens.push((Token::Quoted(value), start));
            }
            '/' => {
                chars.next();
                if chars.peek() == Some(&'/') {
                    while let Some(&ch) = chars.peek() {
                        if ch == '\n' {
                            break;
                        }
                        chars.next();
                    }
                } else {
                    return Err(GenError::Parse {
                        line,
                        message: "stray '/'".into(),
                    });
                }
            }
            _ => {
                let mut word = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_whitespace() || ch == '{' || ch == '}' || ch == '"' {
                        break;
                    }
                    word.push(ch);
                    chars.next();
                }
                tokens.push((Token::Word(word), line));
            }
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |(_, line)| *line)
    }

    fn error(&self, message: impl Into<String>) -> GenError {
        GenError::Parse {
            line: self.line(),
            message: message.into(),
        }
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        self.pos += 1;
        token
    }

    /// Parses the body of a block after its opening brace.
    /// `top_level` blocks end at end of input instead of at a `}`.
    fn parse_body(&mut self, node: &mut Node, top_level: bool) -> Result<()> {
        loop {
            match self.next() {
                None if top_level => return Ok(()),
                None => return Err(self.error(format!("unexpected end of file inside \"{}\"", node.name))),
                Some(Token::Close) if !top_level => return Ok(()),
                Some(Token::Close) => {
                    self.pos -= 1;
                    return Err(self.error("unbalanced '}'"));
                }
                Some(Token::Quoted(key)) => match self.next() {
                    Some(Token::Quoted(value)) => node.properties.push((key, value)),
                    _ => {
                        self.pos -= 1;
                        return Err(self.error(format!("missing value for key \"{}\"", key)));
                    }
                },
                Some(Token::Word(name)) => {
                    if self.next() != Some(Token::Open) {
                        self.pos -= 1;
                        return Err(self.error(format!("expected '{{' after \"{}\"", name)));
                    }
                    let mut child = Node::new(name);
                    self.parse_body(&mut child, false)?;
                    node.children.push(child);
                }
                Some(Token::Open) => {
                    self.pos -= 1;
                    return Err(self.error("block without a name"));
                }
            }
        }
    }
}

impl Document {
    pub fn new(root: Node) -> Self {
        Document { root }
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut parser = Parser {
            tokens: tokenize(text)?,
            pos: 0,
        };
        let mut root = Node::default();
        parser.parse_body(&mut root, true)?;
        Ok(Document { root })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
        Self::parse(&text)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_vmf_string()).map_err(|e| GenError::io(path, e))
    }

    /// Serializes the document the way Hammer lays it out: one block per
    /// line, tab indentation, properties before child blocks.
    pub fn to_vmf_string(&self) -> String {
        let mut out = String::new();
        for child in &self.root.children {
            write_node(&mut out, child, 0);
        }
        out
    }

    /// Every solid, world brushes and brush entities alike.
    pub fn solids(&self) -> Vec<&Node> {
        self.root.find_recurse(Node::is_solid)
    }

    pub fn find_solid(&self, id: u64) -> Option<&Node> {
        self.root.find_first(|n| n.is_solid() && n.id() == Some(id))
    }

    pub fn remove_solid(&mut self, id: u64) -> usize {
        self.root.delete_recurse(|n| n.is_solid() && n.id() == Some(id))
    }

    /// Entities with the given class name, in document order.
    pub fn entities_of_class(&self, classname: &str) -> Vec<&Node> {
        self.root
            .find_recurse(|n| n.name == "entity" && n.has_classname(classname))
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.root.bounds_recurse()
    }

    pub fn max_id(&self) -> u64 {
        self.root.max_id_recurse()
    }

    pub fn increase_ids(&mut self, offset: u64) {
        self.root.increase_id_recurse(offset);
    }

    pub fn translate(&mut self, vector: Vec3) {
        self.root.translate_recurse(vector);
    }

    /// Moves another map's content into this one.
    ///
    /// World brushes (and groups/hidden blocks) join this world. Entities and
    /// top-level `hidden` blocks are placed after this document's last
    /// entity. The other map's editor state blocks ([`EDITOR_BLOCKS`]) are
    /// dropped.
    pub fn absorb(&mut self, other: Document) {
        let mut incoming_world = Vec::new();
        let mut incoming_entities = Vec::new();
        for node in other.root.children {
            match node.name.as_str() {
                "world" => incoming_world.extend(node.children),
                name if EDITOR_BLOCKS.contains(&name) => {}
                _ => incoming_entities.push(node),
            }
        }

        match self.root.children.iter_mut().find(|n| n.name == "world") {
            Some(world) => world.children.extend(incoming_world),
            None => {
                let mut world = Node::new("world").with("classname", "worldspawn");
                world.children = incoming_world;
                self.root.children.push(world);
            }
        }

        let insert_at = self
            .root
            .children
            .iter()
            .rposition(|n| !EDITOR_BLOCKS.contains(&n.name.as_str()))
            .map_or(self.root.children.len(), |i| i + 1);
        for (offset, entity) in incoming_entities.into_iter().enumerate() {
            self.root.children.insert(insert_at + offset, entity);
        }
    }
}

fn write_node(out: &mut String, node: &Node, depth: usize) {
    let indent = "\t".repeat(depth);
    out.push_str(&format!("{}{}\n{}{{\n", indent, node.name, indent));
    for (key, value) in &node.properties {
        out.push_str(&format!("{}\t\"{}\" \"{}\"\n", indent, key, value));
    }
    for child in &node.children {
        write_node(out, child, depth + 1);
    }
    out.push_str(&format!("{}}}\n", indent));
}
