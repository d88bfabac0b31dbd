//! Tag scanning for the machine-written SpreadsheetML dialect.
//!
//! This is deliberately not an XML parser: no nesting of same-named
//! elements, no CDATA, no namespaces beyond literal tag names. It only
//! covers what worksheet and shared-string parts actually contain.

use std::borrow::Cow;

/// One `<tag ...>body</tag>` (or self-closing `<tag .../>`) occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element<'a> {
    pub attrs: &'a str,
    pub body: &'a str,
}

impl<'a> Element<'a> {
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        attr(self.attrs, name)
    }
}

pub struct Elements<'a, 't> {
    xml: &'a str,
    tag: &'t str,
    pos: usize,
}

/// Iterate `tag` elements of `xml` in document order.
pub fn elements<'a, 't>(xml: &'a str, tag: &'t str) -> Elements<'a, 't> {
    Elements { xml, tag, pos: 0 }
}

impl<'a> Iterator for Elements<'a, '_> {
    type Item = Element<'a>;

    fn next(&mut self) -> Option<Element<'a>> {
        let xml = self.xml;
        loop {
            let start = self.pos + xml.get(self.pos..)?.find('<')?;
            let name_end = start + 1 + self.tag.len();
            self.pos = start + 1;

            if xml.get(start + 1..name_end) != Some(self.tag) {
                continue;
            }
            // `<c` must not match `<col`, `<t` must not match `<tableParts`.
            match xml[name_end..].chars().next() {
                Some(ch) if ch == '>' || ch == '/' || ch.is_whitespace() => {}
                _ => continue,
            }

            let open_end = name_end + xml[name_end..].find('>')?;
            if xml[..open_end].ends_with('/') {
                self.pos = open_end + 1;
                return Some(Element {
                    attrs: xml[name_end..open_end - 1].trim(),
                    body: "",
                });
            }

            let close = format!("</{}>", self.tag);
            let body_start = open_end + 1;
            let body_end = body_start + xml[body_start..].find(&close)?;
            self.pos = body_end + close.len();
            return Some(Element {
                attrs: xml[name_end..open_end].trim(),
                body: &xml[body_start..body_end],
            });
        }
    }
}

/// Value of attribute `name` in an attribute list, either quote style.
pub fn attr<'a>(attrs: &'a str, name: &str) -> Option<&'a str> {
    let mut search = 0;
    while let Some(found) = attrs[search..].find(name) {
        let at = search + found;
        search = at + name.len();

        let boundary = attrs[..at]
            .chars()
            .next_back()
            .map_or(true, char::is_whitespace);
        if !boundary {
            continue;
        }
        let rest = attrs[search..].trim_start();
        let Some(rest) = rest.strip_prefix('=') else {
            continue;
        };
        let rest = rest.trim_start();
        let quote = match rest.chars().next() {
            Some(q @ ('"' | '\'')) => q,
            _ => continue,
        };
        let value = &rest[1..];
        return value.find(quote).map(|end| &value[..end]);
    }
    None
}

/// Concatenated, unescaped text of every `tag` element in `xml`.
pub fn text_of(xml: &str, tag: &str) -> String {
    elements(xml, tag).map(|e| unescape(e.body)).collect()
}

/// Decode the predefined entities and numeric character references.
/// Unknown entities are left as written.
pub fn unescape(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest.find(';').and_then(|semi| {
            let ch = match &rest[1..semi] {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                entity => entity.strip_prefix('#').and_then(|num| {
                    let code = match num.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => num.parse().ok(),
                    };
                    code.and_then(char::from_u32)
                }),
            };
            ch.map(|ch| (ch, semi))
        });

        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &rest[semi + 1..];
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
