//! Lossless HTML fragment parser and serializer.
//!
//! Built on `winnow` 0.7. Component templates are small, AI-written markup
//! blocks, so this is a forgiving fragment parser rather than a full HTML5
//! tree builder: it never fails, and it keeps the exact source text of every
//! tag, text run and comment. `Fragment::parse(s).to_markup() == s` holds for
//! any input, as long as nothing has been edited. Only an edited start tag is
//! re-serialized, so an edit changes exactly the bytes it has to.
//!
//! The tree lives in a `StableDiGraph` arena with parent → child edges and
//! an explicit child order per node. Replacing an element's children only
//! detaches the old subtree, so indices collected before an edit never alias
//! nodes created by it.

use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::collections::HashMap;
use winnow::ascii::multispace0;
use winnow::combinator::{alt, delimited, opt};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{one_of, take_till, take_while};

/// Elements that never have children or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose content is raw text up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["style", "script", "textarea", "title"];

/// Elements that implicitly close an open sibling of the same name.
const SELF_CLOSING_SIBLINGS: &[&str] = &["li", "p", "option"];

/// Block-level start tags that implicitly close an open `<p>`.
const CLOSES_PARAGRAPH: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "div", "dl", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hgroup", "hr", "main", "menu", "nav", "ol", "p", "pre", "section", "table", "ul",
];

/// Whether starting `incoming` ends the open element `open`.
fn implicitly_closes(open: &str, incoming: &str) -> bool {
    if open == "p" {
        return CLOSES_PARAGRAPH.contains(&incoming);
    }
    open == incoming && SELF_CLOSING_SIBLINGS.contains(&incoming)
}

// ─── Nodes ───────────────────────────────────────────────────────────────

/// How an attribute value was quoted in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    Double,
    Single,
    Bare,
}

/// A single attribute. The value is stored exactly as written (entities
/// undecoded); `value()` decodes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    name: String,
    raw_value: Option<String>,
    quote: Quote,
}

impl Attribute {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Decoded value; `None` for a bare boolean attribute like `disabled`.
    pub fn value(&self) -> Option<Cow<'_, str>> {
        self.raw_value.as_deref().map(decode_entities)
    }

    fn write(&self, out: &mut String) {
        out.push(' ');
        out.push_str(&self.name);
        if let Some(raw) = &self.raw_value {
            out.push('=');
            match self.quote {
                Quote::Double => {
                    out.push('"');
                    out.push_str(raw);
                    out.push('"');
                }
                Quote::Single => {
                    out.push('\'');
                    out.push_str(raw);
                    out.push('\'');
                }
                Quote::Bare => out.push_str(raw),
            }
        }
    }
}

/// An element node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercased tag name.
    name: String,
    attrs: SmallVec<[Attribute; 4]>,
    /// Source text of the start tag; dropped once an attribute changes.
    start_tag: Option<String>,
    /// Source text of the end tag, if one was written.
    end_tag: Option<String>,
    self_closing: bool,
}

impl Element {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attrs(&self) -> impl Iterator<Item = &Attribute> {
        self.attrs.iter()
    }

    /// Decoded value of the first attribute named `name` (ASCII case-insensitive).
    pub fn attr(&self, name: &str) -> Option<Cow<'_, str>> {
        self.attrs
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .and_then(Attribute::value)
    }

    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.name.as_str())
    }

    fn is_raw_text(&self) -> bool {
        RAW_TEXT_ELEMENTS.contains(&self.name.as_str())
    }

    /// Set an attribute to `value`. Returns `false` when the decoded value
    /// was already equal, leaving the source text untouched.
    fn set_attr(&mut self, name: &str, value: &str) -> bool {
        let encoded = escape_attr(value);
        match self
            .attrs
            .iter_mut()
            .find(|a| a.name.eq_ignore_ascii_case(name))
        {
            Some(attr) => {
                if attr.value().as_deref() == Some(value) {
                    return false;
                }
                attr.raw_value = Some(encoded);
                attr.quote = Quote::Double;
            }
            None => self.attrs.push(Attribute {
                name: name.to_string(),
                raw_value: Some(encoded),
                quote: Quote::Double,
            }),
        }
        self.start_tag = None;
        true
    }

    fn write_start_tag(&self, out: &mut String) {
        if let Some(raw) = &self.start_tag {
            out.push_str(raw);
            return;
        }
        out.push('<');
        out.push_str(&self.name);
        for attr in &self.attrs {
            attr.write(out);
        }
        if self.self_closing {
            out.push_str(" /");
        }
        out.push('>');
    }
}

/// A node in a markup fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    /// Container for the top-level nodes; never serialized itself.
    Root,
    Element(Element),
    /// Text run, kept verbatim (entities undecoded).
    Text(String),
    /// `<!-- ... -->`, delimiters included.
    Comment(String),
    /// Stray end tags and `<!...>`/`<?...>` declarations, kept verbatim.
    Raw(String),
}

// ─── Fragment ────────────────────────────────────────────────────────────

/// A parsed markup fragment: the detached document a template is rendered in.
#[derive(Debug, Clone)]
pub struct Fragment {
    graph: StableDiGraph<MarkupNode, ()>,
    root: NodeIndex,
    child_order: HashMap<NodeIndex, Vec<NodeIndex>>,
}

impl Fragment {
    fn empty() -> Self {
        let mut graph = StableDiGraph::new();
        let root = graph.add_node(MarkupNode::Root);
        Self {
            graph,
            root,
            child_order: HashMap::new(),
        }
    }

    /// Parse markup. Never fails: malformed input is recovered into text or
    /// raw nodes that serialize back to the same bytes.
    pub fn parse(input: &str) -> Self {
        let mut frag = Self::empty();
        let mut open: Vec<NodeIndex> = vec![frag.root];
        let mut rest = input;

        while !rest.is_empty() {
            let parent = open.last().copied().unwrap_or(frag.root);
            match next_token(&mut rest) {
                Token::Text(text) => frag.push_text(parent, text),
                Token::Comment(c) => {
                    frag.add_child(parent, MarkupNode::Comment(c.to_string()));
                }
                Token::Raw(raw) => {
                    frag.add_child(parent, MarkupNode::Raw(raw.to_string()));
                }
                Token::End { name, raw } => frag.close(&mut open, name, raw),
                Token::Start(tag) => {
                    let name = tag.name.to_ascii_lowercase();
                    if open.len() > 1
                        && frag
                            .tag_name(parent)
                            .is_some_and(|open_tag| implicitly_closes(open_tag, &name))
                    {
                        open.pop();
                    }
                    let parent = open.last().copied().unwrap_or(frag.root);
                    let el = Element {
                        name,
                        attrs: tag.attrs,
                        start_tag: Some(tag.raw.to_string()),
                        end_tag: None,
                        self_closing: tag.self_closing,
                    };
                    let is_void = el.is_void();
                    let is_raw_text = el.is_raw_text();
                    let el_name = el.name.clone();
                    let idx = frag.add_child(parent, MarkupNode::Element(el));
                    if tag.self_closing || is_void {
                        continue;
                    }
                    open.push(idx);
                    if is_raw_text {
                        let close = format!("</{el_name}");
                        let end = crate::style::find_ascii_ci(rest, &close).unwrap_or(rest.len());
                        if end > 0 {
                            frag.add_child(idx, MarkupNode::Text(rest[..end].to_string()));
                        }
                        rest = &rest[end..];
                    }
                }
            }
        }

        frag
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn node(&self, idx: NodeIndex) -> Option<&MarkupNode> {
        self.graph.node_weight(idx)
    }

    pub fn element(&self, idx: NodeIndex) -> Option<&Element> {
        match self.graph.node_weight(idx) {
            Some(MarkupNode::Element(el)) => Some(el),
            _ => None,
        }
    }

    pub fn tag_name(&self, idx: NodeIndex) -> Option<&str> {
        self.element(idx).map(Element::name)
    }

    /// Children in document order.
    pub fn children(&self, idx: NodeIndex) -> &[NodeIndex] {
        self.child_order.get(&idx).map_or(&[], Vec::as_slice)
    }

    /// Get the parent index of a node (`None` for the root and detached nodes).
    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .next()
    }

    /// Whether `idx` is still reachable from the root.
    pub fn is_attached(&self, idx: NodeIndex) -> bool {
        let mut current = idx;
        loop {
            if current == self.root {
                return true;
            }
            match self.parent(current) {
                Some(p) => current = p,
                None => return false,
            }
        }
    }

    /// All elements whose `attr` decodes to `value`, in document order.
    pub fn find_by_attr(&self, attr: &str, value: &str) -> Vec<NodeIndex> {
        let mut found = Vec::new();
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            if let Some(el) = self.element(idx)
                && el.attr(attr).as_deref() == Some(value)
            {
                found.push(idx);
            }
            stack.extend(self.children(idx).iter().rev().copied());
        }
        found
    }

    /// Replace an element's children with parsed `markup` (like assigning
    /// `innerHTML`). Void elements are left alone; raw-text elements take
    /// the value as text. Returns `true` if the element was changed.
    pub fn set_inner_markup(&mut self, idx: NodeIndex, markup: &str) -> bool {
        let (void, raw_text) = match self.element(idx) {
            Some(el) => (el.is_void(), el.is_raw_text()),
            None => return false,
        };
        if void {
            return false;
        }

        self.detach_children(idx);
        if let Some(MarkupNode::Element(el)) = self.graph.node_weight_mut(idx)
            && el.self_closing
        {
            el.self_closing = false;
            el.start_tag = None;
            el.end_tag = Some(format!("</{}>", el.name));
        }

        if raw_text {
            if !markup.is_empty() {
                self.add_child(idx, MarkupNode::Text(markup.to_string()));
            }
        } else {
            let parsed = Fragment::parse(markup);
            for &child in parsed.children(parsed.root) {
                self.graft(idx, &parsed, child);
            }
        }
        true
    }

    /// Set an attribute on an element. Returns `true` if the markup changed.
    pub fn set_attribute(&mut self, idx: NodeIndex, name: &str, value: &str) -> bool {
        match self.graph.node_weight_mut(idx) {
            Some(MarkupNode::Element(el)) => el.set_attr(name, value),
            _ => false,
        }
    }

    /// Serialize the whole fragment.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for &child in self.children(self.root) {
            self.write_node(&mut out, child);
        }
        out
    }

    /// Serialize the children of one node.
    pub fn inner_markup(&self, idx: NodeIndex) -> String {
        let mut out = String::new();
        for &child in self.children(idx) {
            self.write_node(&mut out, child);
        }
        out
    }

    // ─── Internals ───────────────────────────────────────────────────────

    fn add_child(&mut self, parent: NodeIndex, node: MarkupNode) -> NodeIndex {
        let idx = self.graph.add_node(node);
        self.graph.add_edge(parent, idx, ());
        self.child_order.entry(parent).or_default().push(idx);
        idx
    }

    /// Append text, merging with a preceding text sibling.
    fn push_text(&mut self, parent: NodeIndex, text: &str) {
        if let Some(&last) = self.children(parent).last()
            && let Some(MarkupNode::Text(existing)) = self.graph.node_weight_mut(last)
        {
            existing.push_str(text);
            return;
        }
        self.add_child(parent, MarkupNode::Text(text.to_string()));
    }

    /// Close the nearest open element named `name`; anything opened inside it
    /// is closed implicitly. A stray end tag is kept as raw text.
    fn close(&mut self, open: &mut Vec<NodeIndex>, name: &str, raw: &str) {
        let pos = open
            .iter()
            .rposition(|&idx| self.tag_name(idx).is_some_and(|t| t.eq_ignore_ascii_case(name)));
        match pos {
            Some(pos) => {
                let idx = open[pos];
                if let Some(MarkupNode::Element(el)) = self.graph.node_weight_mut(idx) {
                    el.end_tag = Some(raw.to_string());
                }
                open.truncate(pos);
            }
            None => {
                let parent = open.last().copied().unwrap_or(self.root);
                self.add_child(parent, MarkupNode::Raw(raw.to_string()));
            }
        }
    }

    fn detach_children(&mut self, idx: NodeIndex) {
        let children = self.child_order.remove(&idx).unwrap_or_default();
        for child in children {
            if let Some(edge) = self.graph.find_edge(idx, child) {
                self.graph.remove_edge(edge);
            }
        }
    }

    /// Deep-copy `other_idx` from another fragment under `parent`.
    fn graft(&mut self, parent: NodeIndex, other: &Fragment, other_idx: NodeIndex) {
        let Some(node) = other.node(other_idx) else {
            return;
        };
        let idx = self.add_child(parent, node.clone());
        for &child in other.children(other_idx) {
            self.graft(idx, other, child);
        }
    }

    fn write_node(&self, out: &mut String, idx: NodeIndex) {
        match &self.graph[idx] {
            MarkupNode::Root => {}
            MarkupNode::Text(s) | MarkupNode::Comment(s) | MarkupNode::Raw(s) => out.push_str(s),
            MarkupNode::Element(el) => {
                el.write_start_tag(out);
                for &child in self.children(idx) {
                    self.write_node(out, child);
                }
                if let Some(end) = &el.end_tag {
                    out.push_str(end);
                }
            }
        }
    }
}

// ─── Tokenizer ───────────────────────────────────────────────────────────

struct StartTag<'a> {
    name: &'a str,
    attrs: SmallVec<[Attribute; 4]>,
    self_closing: bool,
    raw: &'a str,
}

enum Token<'a> {
    Text(&'a str),
    Comment(&'a str),
    Raw(&'a str),
    Start(StartTag<'a>),
    End { name: &'a str, raw: &'a str },
}

/// Always consumes at least one byte of a non-empty input.
fn next_token<'a>(input: &mut &'a str) -> Token<'a> {
    if input.starts_with("<!--") {
        return Token::Comment(comment(input));
    }

    let checkpoint = *input;
    if input.starts_with("</") {
        if let Ok((name, raw)) = end_tag.parse_next(input) {
            return Token::End { name, raw };
        }
    } else if input.starts_with("<!") || input.starts_with("<?") {
        if let Ok(raw) = declaration.parse_next(input) {
            return Token::Raw(raw);
        }
    } else if input.starts_with('<')
        && let Ok(tag) = start_tag.parse_next(input)
    {
        return Token::Start(tag);
    }
    *input = checkpoint;

    Token::Text(text_run(input))
}

/// Text up to the next `<`. A `<` that failed to open a tag is text too.
fn text_run<'a>(input: &mut &'a str) -> &'a str {
    let start = *input;
    let skip = usize::from(start.starts_with('<'));
    let len = start[skip..].find('<').map_or(start.len(), |p| p + skip);
    *input = &start[len..];
    &start[..len]
}

fn comment<'a>(input: &mut &'a str) -> &'a str {
    let start = *input;
    let len = start[4..].find("-->").map_or(start.len(), |p| p + 4 + 3);
    *input = &start[len..];
    &start[..len]
}

fn declaration<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    ('<', one_of(['!', '?']), take_till(0.., '>'), '>')
        .take()
        .parse_next(input)
}

fn tag_name<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    (
        one_of(|c: char| c.is_ascii_alphabetic()),
        take_while(0.., |c: char| {
            c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')
        }),
    )
        .take()
        .parse_next(input)
}

fn end_tag<'a>(input: &mut &'a str) -> ModalResult<(&'a str, &'a str)> {
    let ((_, name, _, _), raw) = ("</", tag_name, multispace0, '>')
        .with_taken()
        .parse_next(input)?;
    Ok((name, raw))
}

fn start_tag<'a>(input: &mut &'a str) -> ModalResult<StartTag<'a>> {
    let start = *input;
    let _ = '<'.parse_next(input)?;
    let name = tag_name.parse_next(input)?;
    let mut attrs = SmallVec::new();
    let mut self_closing = false;

    loop {
        skip_space(input);
        if input.starts_with("/>") {
            *input = &input[2..];
            self_closing = true;
            break;
        }
        if input.starts_with('>') {
            *input = &input[1..];
            break;
        }
        if input.starts_with('/') {
            *input = &input[1..];
            continue;
        }
        if input.is_empty() {
            return Err(ErrMode::Backtrack(ContextError::new()));
        }
        attrs.push(attribute.parse_next(input)?);
    }

    Ok(StartTag {
        name,
        attrs,
        self_closing,
        raw: &start[..start.len() - input.len()],
    })
}

fn attribute(input: &mut &str) -> ModalResult<Attribute> {
    let name = take_while(1.., |c: char| {
        !c.is_whitespace() && !matches!(c, '/' | '>' | '=')
    })
    .parse_next(input)?;

    let checkpoint = *input;
    skip_space(input);
    if opt('=').parse_next(input)?.is_none() {
        *input = checkpoint;
        return Ok(Attribute {
            name: name.to_string(),
            raw_value: None,
            quote: Quote::Bare,
        });
    }
    skip_space(input);

    let (value, quote) = alt((
        delimited('"', take_till(0.., '"'), '"').map(|v: &str| (v, Quote::Double)),
        delimited('\'', take_till(0.., '\''), '\'').map(|v: &str| (v, Quote::Single)),
        take_while(1.., |c: char| !c.is_whitespace() && c != '>').map(|v: &str| (v, Quote::Bare)),
    ))
    .parse_next(input)?;

    Ok(Attribute {
        name: name.to_string(),
        raw_value: Some(value.to_string()),
        quote,
    })
}

/// Consume optional whitespace (concrete error type avoids inference issues).
fn skip_space(input: &mut &str) {
    let _: Result<&str, ErrMode<ContextError>> = multispace0.parse_next(input);
}

// ─── Entities ────────────────────────────────────────────────────────────

/// Decode the character references that appear in attribute values.
/// Unknown references are left as written.
pub fn decode_entities(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').and_then(|semi| {
            let entity = &rest[1..semi];
            let c = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|d| d.parse().ok()))
                    .and_then(char::from_u32),
            }?;
            Some((c, semi + 1))
        });
        match decoded {
            Some((c, len)) => {
                out.push(c);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Escape a value for a double-quoted attribute.
pub fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_lossless(input: &str) {
        assert_eq!(Fragment::parse(input).to_markup(), input);
    }

    #[test]
    fn roundtrip_is_lossless() {
        assert_lossless("<style>.a:hover{color:var(--c)}</style><nav class=\"navbar-f4j7\"><a href=\"#\" data-id=\"logo-g8h2\">Logo</a></nav>");
        assert_lossless("<img src='https://placehold.co/600x400.png' data-ai-hint=\"hero image\"><br/>");
        assert_lossless("  text with <!-- a comment --> and <b>bold</b>\n");
        assert_lossless("<ul><li>one<li>two</ul>");
        assert_lossless("<div>stray</span> end</div>");
        assert_lossless("<p>unclosed <em>at eof");
        assert_lossless("a < b and <3 hearts");
        assert_lossless("<!DOCTYPE html><?xml version=\"1.0\"?><DIV Class=x>Caps</DIV >");
        assert_lossless("<input disabled value=plain><script>if (a < b) {}</script>");
        assert_lossless("<div data-x=\"unterminated");
        assert_lossless("<!-- never closed");
    }

    #[test]
    fn builds_nested_tree() {
        let frag = Fragment::parse("<div><h2 data-id=\"t\">Hi</h2><p>Body</p></div>");
        let top = frag.children(frag.root());
        assert_eq!(top.len(), 1);
        assert_eq!(frag.tag_name(top[0]), Some("div"));
        let kids = frag.children(top[0]);
        assert_eq!(kids.len(), 2);
        assert_eq!(frag.tag_name(kids[0]), Some("h2"));
        assert_eq!(frag.inner_markup(kids[0]), "Hi");
        assert_eq!(frag.parent(kids[1]), Some(top[0]));
    }

    #[test]
    fn raw_text_elements_swallow_markup() {
        let frag = Fragment::parse("<style>.a > .b { }</style><p>x</p>");
        let top = frag.children(frag.root());
        assert_eq!(top.len(), 2);
        assert_eq!(frag.inner_markup(top[0]), ".a > .b { }");
        assert_eq!(frag.tag_name(top[1]), Some("p"));
    }

    #[test]
    fn void_and_implied_closes() {
        let frag = Fragment::parse("<ul><li>a<li><img src=x>b</ul>");
        let ul = frag.children(frag.root())[0];
        let items = frag.children(ul);
        assert_eq!(items.len(), 2);
        // The img is a child of the second li, and "b" follows it there.
        let second = frag.children(items[1]);
        assert_eq!(frag.tag_name(second[0]), Some("img"));
        assert!(frag.children(second[0]).is_empty());
    }

    #[test]
    fn block_start_closes_paragraph() {
        let src = "<p data-id=\"x\">a<div>b</div></p>";
        let mut frag = Fragment::parse(src);
        assert_eq!(frag.to_markup(), src);
        let top = frag.children(frag.root()).to_vec();
        assert_eq!(frag.tag_name(top[0]), Some("p"));
        assert_eq!(frag.tag_name(top[1]), Some("div"));

        // Only the paragraph's own text is replaced; the div stays.
        let p = frag.find_by_attr("data-id", "x")[0];
        assert!(frag.set_inner_markup(p, "z"));
        assert_eq!(frag.to_markup(), "<p data-id=\"x\">z<div>b</div></p>");

        // Inline children stay inside.
        let frag = Fragment::parse("<p>a<span>b</span></p>");
        let p = frag.children(frag.root())[0];
        assert_eq!(frag.children(p).len(), 2);
    }

    #[test]
    fn find_by_attr_in_document_order() {
        let frag = Fragment::parse(
            "<a data-id=\"n\">1</a><div><span data-id=\"n\">2</span></div><b data-id=\"m\">3</b>",
        );
        let found = frag.find_by_attr("data-id", "n");
        assert_eq!(found.len(), 2);
        assert_eq!(frag.tag_name(found[0]), Some("a"));
        assert_eq!(frag.tag_name(found[1]), Some("span"));
        assert!(frag.find_by_attr("data-id", "zzz").is_empty());
    }

    #[test]
    fn set_inner_markup_replaces_children() {
        let mut frag = Fragment::parse("<h2 data-id=\"t\" class='big'>Old <i>x</i></h2>");
        let h2 = frag.find_by_attr("data-id", "t")[0];
        assert!(frag.set_inner_markup(h2, "New <b>bold</b>"));
        assert_eq!(frag.to_markup(), "<h2 data-id=\"t\" class='big'>New <b>bold</b></h2>");
    }

    #[test]
    fn set_inner_markup_skips_void_elements() {
        let mut frag = Fragment::parse("<img data-id=\"i\" src=\"a.png\">");
        let img = frag.find_by_attr("data-id", "i")[0];
        assert!(!frag.set_inner_markup(img, "ignored"));
        assert_eq!(frag.to_markup(), "<img data-id=\"i\" src=\"a.png\">");
    }

    #[test]
    fn set_inner_markup_opens_self_closed_element() {
        let mut frag = Fragment::parse("<span data-id=\"s\"/>");
        let span = frag.find_by_attr("data-id", "s")[0];
        frag.set_inner_markup(span, "hi");
        assert_eq!(frag.to_markup(), "<span data-id=\"s\">hi</span>");
    }

    #[test]
    fn detached_nodes_are_not_attached() {
        let mut frag = Fragment::parse("<div data-id=\"o\"><span data-id=\"i\">x</span></div>");
        let inner = frag.find_by_attr("data-id", "i")[0];
        let outer = frag.find_by_attr("data-id", "o")[0];
        frag.set_inner_markup(outer, "<em>new</em>");
        assert!(!frag.is_attached(inner));
        assert!(frag.is_attached(outer));
    }

    #[test]
    fn set_attribute_only_rewrites_on_change() {
        let mut frag = Fragment::parse("<a  href='#'   data-id=x>Go</a>");
        let a = frag.find_by_attr("data-id", "x")[0];
        assert!(!frag.set_attribute(a, "href", "#"));
        assert_eq!(frag.to_markup(), "<a  href='#'   data-id=x>Go</a>");

        assert!(frag.set_attribute(a, "href", "/buy?a=1&b=\"2\""));
        assert_eq!(
            frag.to_markup(),
            "<a href=\"/buy?a=1&amp;b=&quot;2&quot;\" data-id=x>Go</a>"
        );
        assert_eq!(
            frag.element(a).and_then(|el| el.attr("HREF")).as_deref(),
            Some("/buy?a=1&b=\"2\"")
        );
    }

    #[test]
    fn set_attribute_appends_missing() {
        let mut frag = Fragment::parse("<img data-id=\"i\">");
        let img = frag.find_by_attr("data-id", "i")[0];
        assert!(frag.set_attribute(img, "src", "b.png"));
        assert_eq!(frag.to_markup(), "<img data-id=\"i\" src=\"b.png\">");
    }

    #[test]
    fn entity_decoding() {
        assert_eq!(decode_entities("a&amp;b&#39;c&#x41;&bogus;"), "a&b'cA&bogus;");
        assert_eq!(decode_entities("plain"), "plain");
        assert_eq!(decode_entities("trailing &"), "trailing &");
    }
}
