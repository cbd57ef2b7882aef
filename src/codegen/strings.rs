//! Global string constants for the generated module.

/// Escape `bytes` for an LLVM `c"..."` initializer. Printable ASCII other
/// than `"` and `\` is kept; everything else becomes `\XX`.
pub fn escape(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        if (0x20..0x7f).contains(&b) && b != b'"' && b != b'\\' {
            out.push(b as char);
        } else {
            out.push_str(&format!("\\{:02X}", b));
        }
    }
    out
}

#[derive(Debug, Clone)]
struct Constant {
    name: String,
    bytes: Vec<u8>,
}

/// Interned, NUL-terminated string constants in order of first use.
#[derive(Debug, Clone, Default)]
pub struct StringPool {
    constants: Vec<Constant>,
}

impl StringPool {
    /// Global name for `text` (NUL added here), reusing an existing entry.
    pub fn intern(&mut self, prefix: &str, text: &str) -> String {
        let mut bytes = text.as_bytes().to_vec();
        bytes.push(0);
        if let Some(existing) = self.constants.iter().find(|c| c.bytes == bytes) {
            return existing.name.clone();
        }
        let name = format!("@{}.{}", prefix, self.constants.len());
        self.constants.push(Constant {
            name: name.clone(),
            bytes,
        });
        name
    }

    /// The `[N x i8]` array type of an interned constant.
    pub fn array_type(&self, name: &str) -> Option<String> {
        self.constants
            .iter()
            .find(|c| c.name == name)
            .map(|c| format!("[{} x i8]", c.bytes.len()))
    }

    pub fn definitions(&self) -> impl Iterator<Item = String> + '_ {
        self.constants.iter().map(|c| {
            format!(
                "{} = private unnamed_addr constant [{} x i8] c\"{}\"",
                c.name,
                c.bytes.len(),
                escape(&c.bytes)
            )
        })
    }
}
