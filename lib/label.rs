//! Rendering of LaTeX snippets into SVG text, with memoization.
//!
//! Labels are written in LaTeX (e.g. `$\frac{1}{\sqrt{2}}\ket{01}$`) and
//! handed to a [`LabelRenderer`]. The default [`TextRenderer`] understands the
//! small subset of math-mode LaTeX that this crate produces and turns it into
//! SVG `<tspan>` markup using unicode math symbols, so no TeX installation is
//! needed. Rendered labels are cached per LaTeX string in a [`LabelCache`].

use std::{ cell::RefCell, fmt, rc::Rc };
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::debug;
use crate::style::Rgb;

#[derive(Debug, Error)]
pub enum LabelError {
    /// Returned when braces or math delimiters are unbalanced, or a command
    /// is missing an argument.
    #[error("malformed LaTeX '{0}': {1}")]
    Malformed(String, &'static str),

    /// Returned for commands outside the supported subset.
    #[error("unsupported LaTeX command '\\{0}'")]
    UnsupportedCommand(String),

    /// Returned for colors that cannot be parsed as an xcolor expression.
    #[error("unknown color '{0}'")]
    UnknownColor(String),
}
pub type LabelResult<T> = Result<T, LabelError>;

/// A rendered label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Label {
    /// The LaTeX source.
    pub latex: String,
    /// SVG markup to place inside a `<text>` element.
    pub markup: String,
    /// The label as plain unicode text.
    pub plain: String,
}

/// Something that turns LaTeX into drawable labels.
///
/// Rendering must be a pure function of its input, since results are
/// memoized by [`LabelCache`].
pub trait LabelRenderer {
    fn render(&self, latex: &str) -> LabelResult<Label>;
}

/// Renders the crate's LaTeX subset as SVG text.
///
/// Supported: `$…$`, groups, `\frac`, `\sqrt`, `\ket`, `\mathrm`, `\text`,
/// `\color{…}` (xcolor names and `!` mixes), sub/superscripts, Greek letters,
/// a few operators, and spacing commands.
#[derive(Copy, Clone, Debug, Default)]
pub struct TextRenderer;

impl LabelRenderer for TextRenderer {
    fn render(&self, latex: &str) -> LabelResult<Label> {
        let nodes = Parser::new(latex).parse()?;
        let mut markup = String::new();
        emit_markup(&nodes, &mut markup);
        let plain = plain_text(&nodes);
        Ok(Label { latex: latex.to_string(), markup, plain })
    }
}

/// Memoizing front end to a [`LabelRenderer`].
///
/// Entries are never evicted. The cache is meant to be created once and
/// shared by reference between diagrams.
pub struct LabelCache {
    renderer: Box<dyn LabelRenderer>,
    memo: RefCell<FxHashMap<String, Rc<Label>>>,
}

impl fmt::Debug for LabelCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabelCache")
            .field("entries", &self.memo.borrow().len())
            .finish()
    }
}

impl Default for LabelCache {
    fn default() -> Self { Self::new(TextRenderer) }
}

impl LabelCache {
    /// Create a new, empty cache around `renderer`.
    pub fn new<R>(renderer: R) -> Self
    where R: LabelRenderer + 'static
    {
        Self { renderer: Box::new(renderer), memo: RefCell::new(FxHashMap::default()) }
    }

    /// Return the rendered label for `latex`, rendering it on first use.
    pub fn get(&self, latex: &str) -> LabelResult<Rc<Label>> {
        if let Some(label) = self.memo.borrow().get(latex) {
            return Ok(Rc::clone(label));
        }
        let label = Rc::new(self.renderer.render(latex)?);
        debug!(latex, "rendered label");
        self.memo.borrow_mut().insert(latex.to_string(), Rc::clone(&label));
        Ok(label)
    }

    /// Return the number of cached labels.
    pub fn len(&self) -> usize { self.memo.borrow().len() }

    /// Return `true` if nothing has been cached.
    pub fn is_empty(&self) -> bool { self.memo.borrow().is_empty() }

    /// Drop all cached labels.
    pub fn clear(&self) { self.memo.borrow_mut().clear(); }
}

#[derive(Clone, Debug, PartialEq)]
enum Node {
    Text(String),
    Group(Vec<Node>),
    Frac(Vec<Node>, Vec<Node>),
    Sqrt(Vec<Node>),
    Ket(Vec<Node>),
    Sub(Vec<Node>),
    Sup(Vec<Node>),
    // applies to the rest of the enclosing group
    Color(Rgb),
}

fn symbol(cmd: &str) -> Option<&'static str> {
    let s = match cmd {
        "pi" => "π",
        "theta" => "θ",
        "phi" | "varphi" => "φ",
        "psi" => "ψ",
        "alpha" => "α",
        "beta" => "β",
        "gamma" => "γ",
        "omega" => "ω",
        "cdot" => "·",
        "times" => "×",
        "pm" => "±",
        "mp" => "∓",
        "infty" => "∞",
        "langle" => "⟨",
        "rangle" => "⟩",
        "," => "\u{2009}",
        ";" | ":" => "\u{2005}",
        "quad" => "\u{2003}",
        " " => " ",
        "!" => "",
        "{" => "{",
        "}" => "}",
        "%" => "%",
        "$" => "$",
        "&" => "&",
        "_" => "_",
        _ => { return None; },
    };
    Some(s)
}

struct Parser<'a> {
    src: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, chars: src.chars().collect(), pos: 0 }
    }

    fn malformed(&self, msg: &'static str) -> LabelError {
        LabelError::Malformed(self.src.to_string(), msg)
    }

    fn peek(&self) -> Option<char> { self.chars.get(self.pos).copied() }

    fn parse(mut self) -> LabelResult<Vec<Node>> {
        let nodes = self.parse_seq(false)?;
        if self.pos < self.chars.len() { return Err(self.malformed("unmatched '}'")); }
        Ok(nodes)
    }

    // parse until end of input or, if `in_group`, a closing brace
    fn parse_seq(&mut self, in_group: bool) -> LabelResult<Vec<Node>> {
        let mut nodes: Vec<Node> = Vec::new();
        let mut math = false;
        while let Some(c) = self.peek() {
            match c {
                '}' => {
                    if in_group { break; }
                    return Err(self.malformed("unmatched '}'"));
                },
                '$' => {
                    self.pos += 1;
                    if !in_group { math = !math; }
                },
                _ => {
                    let node = self.parse_atom()?;
                    push_node(&mut nodes, node);
                },
            }
        }
        if in_group && self.peek().is_none() {
            return Err(self.malformed("unmatched '{'"));
        }
        if math { return Err(self.malformed("unmatched '$'")); }
        Ok(nodes)
    }

    fn parse_group(&mut self) -> LabelResult<Vec<Node>> {
        // at '{'
        self.pos += 1;
        let nodes = self.parse_seq(true)?;
        self.pos += 1;
        Ok(nodes)
    }

    // a braced group or a single token
    fn parse_arg(&mut self) -> LabelResult<Vec<Node>> {
        while self.peek() == Some(' ') { self.pos += 1; }
        match self.peek() {
            None | Some('}') => Err(self.malformed("missing argument")),
            Some('{') => self.parse_group(),
            Some(_) => Ok(vec![self.parse_atom()?]),
        }
    }

    fn parse_raw_arg(&mut self) -> LabelResult<String> {
        while self.peek() == Some(' ') { self.pos += 1; }
        if self.peek() != Some('{') { return Err(self.malformed("missing argument")); }
        self.pos += 1;
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '}' { break; }
            if c == '{' { return Err(self.malformed("nested braces in color")); }
            self.pos += 1;
        }
        if self.peek().is_none() { return Err(self.malformed("unmatched '{'")); }
        let raw: String = self.chars[start..self.pos].iter().collect();
        self.pos += 1;
        Ok(raw)
    }

    fn parse_atom(&mut self) -> LabelResult<Node> {
        let Some(c) = self.peek() else {
            return Err(self.malformed("unexpected end of input"));
        };
        match c {
            '{' => Ok(Node::Group(self.parse_group()?)),
            '\\' => self.parse_command(),
            '_' => { self.pos += 1; Ok(Node::Sub(self.parse_arg()?)) },
            '^' => { self.pos += 1; Ok(Node::Sup(self.parse_arg()?)) },
            '~' => { self.pos += 1; Ok(Node::Text(" ".to_string())) },
            '-' => { self.pos += 1; Ok(Node::Text("−".to_string())) },
            c => { self.pos += 1; Ok(Node::Text(c.to_string())) },
        }
    }

    fn parse_command(&mut self) -> LabelResult<Node> {
        // at '\'
        self.pos += 1;
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        if self.pos == start {
            // control symbol like \, or \{
            let Some(c) = self.peek() else {
                return Err(self.malformed("trailing backslash"));
            };
            self.pos += 1;
            let name = c.to_string();
            return symbol(&name)
                .map(|s| Node::Text(s.to_string()))
                .ok_or(LabelError::UnsupportedCommand(name));
        }
        let name: String = self.chars[start..self.pos].iter().collect();
        match name.as_str() {
            "frac" => {
                let num = self.parse_arg()?;
                let den = self.parse_arg()?;
                Ok(Node::Frac(num, den))
            },
            "sqrt" => Ok(Node::Sqrt(self.parse_arg()?)),
            "ket" => Ok(Node::Ket(self.parse_arg()?)),
            "mathrm" | "text" | "mathit" | "mathbf" | "operatorname"
                => Ok(Node::Group(self.parse_arg()?)),
            "color" => {
                let spec = self.parse_raw_arg()?;
                Ok(Node::Color(parse_xcolor(&spec)?))
            },
            "left" | "right" => {
                match self.peek() {
                    Some('.') => { self.pos += 1; Ok(Node::Text(String::new())) },
                    Some(_) => self.parse_atom(),
                    None => Err(self.malformed("missing delimiter")),
                }
            },
            other => {
                symbol(other)
                    .map(|s| Node::Text(s.to_string()))
                    .ok_or_else(|| LabelError::UnsupportedCommand(other.to_string()))
            },
        }
    }
}

// merge adjacent text runs
fn push_node(nodes: &mut Vec<Node>, node: Node) {
    if let Node::Text(s) = &node {
        if let Some(Node::Text(prev)) = nodes.last_mut() {
            prev.push_str(s);
            return;
        }
    }
    nodes.push(node);
}

fn named_color(name: &str) -> Option<[f64; 3]> {
    let rgb = match name {
        "red" => [1.0, 0.0, 0.0],
        "green" => [0.0, 1.0, 0.0],
        "blue" => [0.0, 0.0, 1.0],
        "cyan" => [0.0, 1.0, 1.0],
        "magenta" => [1.0, 0.0, 1.0],
        "yellow" => [1.0, 1.0, 0.0],
        "black" => [0.0, 0.0, 0.0],
        "white" => [1.0, 1.0, 1.0],
        "gray" => [0.5, 0.5, 0.5],
        "darkgray" => [0.25, 0.25, 0.25],
        "lightgray" => [0.75, 0.75, 0.75],
        "brown" => [0.75, 0.5, 0.25],
        "lime" => [0.75, 1.0, 0.0],
        "olive" => [0.5, 0.5, 0.0],
        "orange" => [1.0, 0.5, 0.0],
        "pink" => [1.0, 0.75, 0.75],
        "purple" => [0.75, 0.0, 0.25],
        "teal" => [0.0, 0.5, 0.5],
        "violet" => [0.5, 0.0, 0.5],
        _ => { return None; },
    };
    Some(rgb)
}

/// Parse an xcolor expression such as `red`, `blue!50`, or
/// `red!80!black!60!white`.
///
/// `a!p!b` is *p*% of `a` mixed with (100 – *p*)% of `b`; a missing final
/// color is white.
pub fn parse_xcolor(spec: &str) -> LabelResult<Rgb> {
    let unknown = || LabelError::UnknownColor(spec.to_string());
    let mut parts = spec.trim().split('!');
    let first = parts.next().ok_or_else(unknown)?;
    let mut color = named_color(first.trim()).ok_or_else(unknown)?;
    while let Some(pct) = parts.next() {
        let p: f64 = pct.trim().parse().map_err(|_| unknown())?;
        if !(0.0..=100.0).contains(&p) { return Err(unknown()); }
        let other
            = match parts.next() {
                Some(name) => named_color(name.trim()).ok_or_else(unknown)?,
                None => [1.0, 1.0, 1.0],
            };
        let w = p / 100.0;
        for (c, o) in color.iter_mut().zip(other) {
            *c = w * *c + (1.0 - w) * o;
        }
    }
    let to_u8 = |f: f64| (f * 255.0).round().clamp(0.0, 255.0) as u8;
    Ok(Rgb(to_u8(color[0]), to_u8(color[1]), to_u8(color[2])))
}

fn escape(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}

fn plain_text(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            Node::Text(s) => out.push_str(s),
            Node::Group(inner) => out.push_str(&plain_text(inner)),
            Node::Frac(num, den) => {
                out.push_str(&frac_side(&plain_text(num), false));
                out.push('/');
                out.push_str(&frac_side(&plain_text(den), true));
            },
            Node::Sqrt(inner) => {
                out.push('√');
                out.push_str(&sqrt_arg(&plain_text(inner)));
            },
            Node::Ket(inner) => {
                out.push('|');
                out.push_str(&plain_text(inner));
                out.push('⟩');
            },
            Node::Sub(inner) => out.push_str(&plain_text(inner)),
            Node::Sup(inner) => {
                out.push('^');
                out.push_str(&plain_text(inner));
            },
            Node::Color(_) => { },
        }
    }
    out
}

// wrap one side of a fraction in parentheses when it would read ambiguously
fn frac_side(s: &str, denominator: bool) -> String {
    let body = s.strip_prefix('−').unwrap_or(s);
    let compound = body.contains(['+', '−', ' ']);
    let simple_den
        = body.chars().count() <= 1
        || body.chars().all(|c| c.is_ascii_digit())
        || body.strip_prefix('√').is_some_and(|r| r.chars().all(|c| c.is_ascii_digit()));
    if compound || (denominator && !simple_den) {
        format!("({})", s)
    } else {
        s.to_string()
    }
}

fn sqrt_arg(s: &str) -> String {
    if s.chars().count() <= 1 || s.chars().all(|c| c.is_ascii_digit()) {
        s.to_string()
    } else {
        format!("({})", s)
    }
}

fn emit_markup(nodes: &[Node], out: &mut String) {
    for (k, node) in nodes.iter().enumerate() {
        match node {
            Node::Text(s) => escape(s, out),
            Node::Group(inner) => emit_markup(inner, out),
            Node::Frac(num, den) => {
                let n = frac_side(&plain_text(num), false);
                let d = frac_side(&plain_text(den), true);
                if n.starts_with('(') {
                    out.push('(');
                    emit_markup(num, out);
                    out.push(')');
                } else {
                    emit_markup(num, out);
                }
                out.push('/');
                if d.starts_with('(') {
                    out.push('(');
                    emit_markup(den, out);
                    out.push(')');
                } else {
                    emit_markup(den, out);
                }
            },
            Node::Sqrt(inner) => {
                out.push('√');
                if sqrt_arg(&plain_text(inner)).starts_with('(') {
                    out.push('(');
                    emit_markup(inner, out);
                    out.push(')');
                } else {
                    emit_markup(inner, out);
                }
            },
            Node::Ket(inner) => {
                out.push('|');
                emit_markup(inner, out);
                out.push('⟩');
            },
            Node::Sub(inner) => {
                out.push_str("<tspan baseline-shift=\"sub\" font-size=\"70%\">");
                emit_markup(inner, out);
                out.push_str("</tspan>");
            },
            Node::Sup(inner) => {
                out.push_str("<tspan baseline-shift=\"super\" font-size=\"70%\">");
                emit_markup(inner, out);
                out.push_str("</tspan>");
            },
            Node::Color(rgb) => {
                out.push_str(&format!("<tspan fill=\"{}\">", rgb));
                emit_markup(&nodes[k + 1..], out);
                out.push_str("</tspan>");
                return;
            },
        }
    }
}
