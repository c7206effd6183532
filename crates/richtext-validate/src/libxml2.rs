//! Direct libxml2 FFI for grammar-based schema validation.
//!
//! The Rust ecosystem has no mature RELAX NG or XSD validator, so this module
//! binds libxml2 directly. Grammar parsing is not thread-safe and happens
//! once per schema at construction; validation creates a fresh context per
//! call and is safe to run from multiple threads over one shared grammar.
//! Structured error callbacks collect every diagnostic message instead of
//! letting libxml2 print to stderr.

use std::ffi::CStr;
use std::marker::PhantomData;
use std::ptr;
use std::sync::{Arc, Once};

use libc::{c_char, c_int, c_void};

static INIT: Once = Once::new();

/// Forbid network fetches while parsing (XML_PARSE_NONET).
const PARSE_OPTIONS: c_int = 1 << 11;

// Opaque libxml2 structures.
#[repr(C)]
pub struct XmlDoc {
    _private: [u8; 0],
}

#[repr(C)]
pub struct XmlRelaxNG {
    _private: [u8; 0],
}

#[repr(C)]
pub struct XmlRelaxNGParserCtxt {
    _private: [u8; 0],
}

#[repr(C)]
pub struct XmlRelaxNGValidCtxt {
    _private: [u8; 0],
}

#[repr(C)]
pub struct XmlSchema {
    _private: [u8; 0],
}

#[repr(C)]
pub struct XmlSchemaParserCtxt {
    _private: [u8; 0],
}

#[repr(C)]
pub struct XmlSchemaValidCtxt {
    _private: [u8; 0],
}

#[repr(C)]
pub struct XmlError {
    pub domain: c_int,
    pub code: c_int,
    pub message: *const c_char,
    pub level: c_int,
    pub file: *const c_char,
    pub line: c_int,
    pub str1: *const c_char,
    pub str2: *const c_char,
    pub str3: *const c_char,
    pub int1: c_int,
    pub int2: c_int,
    pub ctxt: *mut c_void,
    pub node: *mut c_void,
}

pub type XmlStructuredErrorFunc =
    Option<unsafe extern "C" fn(user_data: *mut c_void, error: *mut XmlError)>;

#[cfg_attr(target_os = "windows", link(name = "libxml2"))]
#[cfg_attr(not(target_os = "windows"), link(name = "xml2"))]
unsafe extern "C" {
    fn xmlInitParser();

    fn xmlReadMemory(
        buffer: *const c_char,
        size: c_int,
        url: *const c_char,
        encoding: *const c_char,
        options: c_int,
    ) -> *mut XmlDoc;
    fn xmlFreeDoc(doc: *mut XmlDoc);

    fn xmlRelaxNGNewMemParserCtxt(buffer: *const c_char, size: c_int)
    -> *mut XmlRelaxNGParserCtxt;
    fn xmlRelaxNGParse(ctxt: *mut XmlRelaxNGParserCtxt) -> *mut XmlRelaxNG;
    fn xmlRelaxNGFreeParserCtxt(ctxt: *mut XmlRelaxNGParserCtxt);
    fn xmlRelaxNGFree(schema: *mut XmlRelaxNG);
    fn xmlRelaxNGNewValidCtxt(schema: *const XmlRelaxNG) -> *mut XmlRelaxNGValidCtxt;
    fn xmlRelaxNGFreeValidCtxt(ctxt: *mut XmlRelaxNGValidCtxt);
    fn xmlRelaxNGSetValidStructuredErrors(
        ctxt: *mut XmlRelaxNGValidCtxt,
        serror: XmlStructuredErrorFunc,
        ctx: *mut c_void,
    );
    fn xmlRelaxNGValidateDoc(ctxt: *mut XmlRelaxNGValidCtxt, doc: *mut XmlDoc) -> c_int;

    fn xmlSchemaNewMemParserCtxt(buffer: *const c_char, size: c_int) -> *mut XmlSchemaParserCtxt;
    fn xmlSchemaParse(ctxt: *mut XmlSchemaParserCtxt) -> *mut XmlSchema;
    fn xmlSchemaFreeParserCtxt(ctxt: *mut XmlSchemaParserCtxt);
    fn xmlSchemaFree(schema: *mut XmlSchema);
    fn xmlSchemaNewValidCtxt(schema: *const XmlSchema) -> *mut XmlSchemaValidCtxt;
    fn xmlSchemaFreeValidCtxt(ctxt: *mut XmlSchemaValidCtxt);
    fn xmlSchemaSetValidStructuredErrors(
        ctxt: *mut XmlSchemaValidCtxt,
        serror: XmlStructuredErrorFunc,
        ctx: *mut c_void,
    );
    fn xmlSchemaValidateDoc(ctxt: *mut XmlSchemaValidCtxt, doc: *mut XmlDoc) -> c_int;
}

/// Collects each structured diagnostic into the `Vec<String>` behind
/// `user_data`.
unsafe extern "C" fn collect_error(user_data: *mut c_void, error: *mut XmlError) {
    if error.is_null() {
        return;
    }
    let errors = unsafe { &mut *user_data.cast::<Vec<String>>() };
    let message = unsafe { (*error).message };
    if message.is_null() {
        return;
    }
    if let Ok(text) = unsafe { CStr::from_ptr(message) }.to_str() {
        errors.push(text.trim().to_owned());
    }
}

fn init() {
    INIT.call_once(|| unsafe {
        xmlInitParser();
    });
}

/// Which grammar language a schema file uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarKind {
    /// RELAX NG (`.rng`).
    RelaxNg,
    /// W3C XML Schema (`.xsd`).
    XmlSchema,
}

enum Handle {
    RelaxNg(*mut XmlRelaxNG),
    XmlSchema(*mut XmlSchema),
}

struct GrammarInner {
    handle: Handle,
    _phantom: PhantomData<*mut c_void>,
}

// Compiled grammars are read-only after parsing and documented thread-safe
// for validation; the raw pointers never escape this module.
unsafe impl Send for GrammarInner {}
unsafe impl Sync for GrammarInner {}

impl Drop for GrammarInner {
    fn drop(&mut self) {
        unsafe {
            match self.handle {
                Handle::RelaxNg(ptr) if !ptr.is_null() => xmlRelaxNGFree(ptr),
                Handle::XmlSchema(ptr) if !ptr.is_null() => xmlSchemaFree(ptr),
                _ => {}
            }
        }
    }
}

/// A compiled, shareable schema grammar.
#[derive(Clone)]
pub struct Grammar {
    inner: Arc<GrammarInner>,
}

impl Grammar {
    /// Compile grammar source held in memory, or `None` when it does not
    /// parse as the given grammar language.
    #[must_use]
    pub fn compile(kind: GrammarKind, source: &[u8]) -> Option<Self> {
        init();
        let buffer = source.as_ptr().cast::<c_char>();
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let size = source.len() as c_int;
        let handle = unsafe {
            match kind {
                GrammarKind::RelaxNg => {
                    let ctxt = xmlRelaxNGNewMemParserCtxt(buffer, size);
                    if ctxt.is_null() {
                        return None;
                    }
                    let grammar = xmlRelaxNGParse(ctxt);
                    xmlRelaxNGFreeParserCtxt(ctxt);
                    if grammar.is_null() {
                        return None;
                    }
                    Handle::RelaxNg(grammar)
                }
                GrammarKind::XmlSchema => {
                    let ctxt = xmlSchemaNewMemParserCtxt(buffer, size);
                    if ctxt.is_null() {
                        return None;
                    }
                    let grammar = xmlSchemaParse(ctxt);
                    xmlSchemaFreeParserCtxt(ctxt);
                    if grammar.is_null() {
                        return None;
                    }
                    Handle::XmlSchema(grammar)
                }
            }
        };
        Some(Self {
            inner: Arc::new(GrammarInner {
                handle,
                _phantom: PhantomData,
            }),
        })
    }

    /// Validate a serialized document, returning every diagnostic message.
    ///
    /// An empty list means the document conforms. Internal libxml2 failures
    /// are reported as messages too; this function never panics or aborts.
    #[must_use]
    pub fn validate(&self, document: &str) -> Vec<String> {
        init();
        let mut errors: Vec<String> = Vec::new();
        let errors_ptr = ptr::addr_of_mut!(errors).cast::<c_void>();

        unsafe {
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let doc = xmlReadMemory(
                document.as_ptr().cast::<c_char>(),
                document.len() as c_int,
                ptr::null(),
                ptr::null(),
                PARSE_OPTIONS,
            );
            if doc.is_null() {
                return vec!["document could not be parsed for schema validation".to_owned()];
            }

            let code = match self.inner.handle {
                Handle::RelaxNg(grammar) => {
                    let ctxt = xmlRelaxNGNewValidCtxt(grammar);
                    if ctxt.is_null() {
                        xmlFreeDoc(doc);
                        return vec!["could not create RELAX NG validation context".to_owned()];
                    }
                    xmlRelaxNGSetValidStructuredErrors(ctxt, Some(collect_error), errors_ptr);
                    let code = xmlRelaxNGValidateDoc(ctxt, doc);
                    xmlRelaxNGFreeValidCtxt(ctxt);
                    code
                }
                Handle::XmlSchema(grammar) => {
                    let ctxt = xmlSchemaNewValidCtxt(grammar);
                    if ctxt.is_null() {
                        xmlFreeDoc(doc);
                        return vec!["could not create XSD validation context".to_owned()];
                    }
                    xmlSchemaSetValidStructuredErrors(ctxt, Some(collect_error), errors_ptr);
                    let code = xmlSchemaValidateDoc(ctxt, doc);
                    xmlSchemaFreeValidCtxt(ctxt);
                    code
                }
            };
            xmlFreeDoc(doc);

            match code {
                0 => Vec::new(),
                n if n > 0 => {
                    if errors.is_empty() {
                        errors.push("document does not conform to schema".to_owned());
                    }
                    errors
                }
                n => vec![format!("internal schema validation error ({n})")],
            }
        }
    }
}
