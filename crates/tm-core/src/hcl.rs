//! HCL block model and writer
//!
//! Every generated block goes through [`HclWriter`], so quoting and escaping
//! live in exactly one place.

use std::fmt::Write as _;

/// Attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Quoted string
    String(String),
    /// Unquoted integer
    Number(u64),
    /// Unquoted boolean
    Bool(bool),
    /// Unquoted traversal such as `maas_fabric.core.id`
    Reference(String),
    /// Inline list
    List(Vec<Value>),
    /// Object expression with ordered keys
    Map(Vec<(String, Value)>),
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Number(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(value.into())
    }
}

impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Value::Number(value.into())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

/// A block: `<kind> "<label>"... { attributes; nested blocks }`
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind: String,
    pub labels: Vec<String>,
    pub attributes: Vec<(String, Value)>,
    pub blocks: Vec<Block>,
}

impl Block {
    /// Create new block without labels
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            labels: Vec::new(),
            attributes: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// `resource "<type>" "<name>"`
    pub fn resource(resource_type: &str, name: &str) -> Self {
        Self::new("resource").with_label(resource_type).with_label(name)
    }

    /// `data "<type>" "<name>"`
    pub fn data(data_type: &str, name: &str) -> Self {
        Self::new("data").with_label(data_type).with_label(name)
    }

    /// `provider "<name>"`
    pub fn provider(name: &str) -> Self {
        Self::new("provider").with_label(name)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    /// Append an attribute
    pub fn attr(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes.push((key.to_string(), value.into()));
        self
    }

    /// Append an attribute only when a value is present
    pub fn attr_opt(self, key: &str, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(value) => self.attr(key, value),
            None => self,
        }
    }

    /// Append an unquoted reference attribute
    pub fn reference(self, key: &str, target: impl Into<String>) -> Self {
        self.attr(key, Value::Reference(target.into()))
    }

    /// Append a list of strings, skipped when empty
    pub fn string_list(self, key: &str, items: &[String]) -> Self {
        if items.is_empty() {
            return self;
        }
        let list = items.iter().cloned().map(Value::String).collect();
        self.attr(key, Value::List(list))
    }

    /// Append a nested block
    pub fn block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    /// Traversal prefix other blocks use to reference this one
    /// (`maas_vlan.vlan-10`, `data.maas_fabric.default`).
    pub fn address(&self) -> Option<String> {
        match (self.kind.as_str(), self.labels.as_slice()) {
            ("resource", [ty, name]) => Some(format!("{}.{}", ty, name)),
            ("data", [ty, name]) => Some(format!("data.{}.{}", ty, name)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

impl std::fmt::Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&HclWriter::new().write_block(self))
    }
}

/// Serializes blocks into HCL text
#[derive(Debug, Clone)]
pub struct HclWriter {
    indent_width: usize,
}

impl HclWriter {
    /// Create writer with two-space indentation
    pub fn new() -> Self {
        Self { indent_width: 2 }
    }

    /// Render blocks separated by a blank line
    pub fn write_document(&self, blocks: &[Block]) -> String {
        let mut output = String::new();
        for (i, block) in blocks.iter().enumerate() {
            if i > 0 {
                output.push('\n');
            }
            self.write_block_at(&mut output, block, 0);
        }
        output
    }

    /// Render a single block, terminated by a newline
    pub fn write_block(&self, block: &Block) -> String {
        let mut output = String::new();
        self.write_block_at(&mut output, block, 0);
        output
    }

    fn write_block_at(&self, out: &mut String, block: &Block, depth: usize) {
        let pad = self.pad(depth);
        out.push_str(&pad);
        out.push_str(&block.kind);
        for label in &block.labels {
            let _ = write!(out, " \"{}\"", escape(label));
        }
        out.push_str(" {\n");

        for (key, value) in &block.attributes {
            let _ = write!(out, "{}{} = ", self.pad(depth + 1), key);
            self.write_value(out, value, depth + 1);
            out.push('\n');
        }

        for nested in &block.blocks {
            self.write_block_at(out, nested, depth + 1);
        }

        out.push_str(&pad);
        out.push_str("}\n");
    }

    fn write_value(&self, out: &mut String, value: &Value, depth: usize) {
        match value {
            Value::String(s) => {
                let _ = write!(out, "\"{}\"", escape(s));
            }
            Value::Number(n) => {
                let _ = write!(out, "{}", n);
            }
            Value::Bool(b) => {
                let _ = write!(out, "{}", b);
            }
            Value::Reference(r) => out.push_str(r),
            Value::List(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.write_value(out, item, depth);
                }
                out.push(']');
            }
            Value::Map(entries) => {
                if entries.is_empty() {
                    out.push_str("{}");
                    return;
                }
                out.push_str("{\n");
                for (key, value) in entries {
                    let _ = write!(out, "{}{} = ", self.pad(depth + 1), key);
                    self.write_value(out, value, depth + 1);
                    out.push('\n');
                }
                out.push_str(&self.pad(depth));
                out.push('}');
            }
        }
    }

    fn pad(&self, depth: usize) -> String {
        " ".repeat(depth * self.indent_width)
    }
}

impl Default for HclWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Escape a string for use inside an HCL quoted template
pub fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            // Template sequences would otherwise be interpolated by terraform.
            '$' | '%' if chars.peek() == Some(&'{') => {
                escaped.push(c);
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}
