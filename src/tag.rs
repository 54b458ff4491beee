//! Per-context structured tags.
//!
//! A [`LogTag`] carries ordered key/value metadata and an optional severity
//! override. Tags are pooled, and a concurrent map keyed by a per-thread
//! context id associates at most one tag with each logical context, so call
//! sites can attach metadata without threading a parameter through every
//! call. [`watch`] installs the association, [`defer`] tears it down and
//! recycles the tag; a context that never calls [`defer`] leaks its entry.

use std::{
    cell::Cell,
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
};

use crossbeam_skiplist::SkipMap;
use once_cell::sync::Lazy;

use crate::{level::Level, pool::Pool};

/// Idle tags retained for reuse.
const TAG_POOL_CAPACITY: usize = 1024;

static TAG_POOL: Lazy<Pool<Arc<LogTag>>> = Lazy::new(|| {
    Pool::new(
        TAG_POOL_CAPACITY,
        || Arc::new(LogTag::new()),
        |tag| tag.reset(),
    )
});

/// Context id -> associated tag. Entries are inserted and removed
/// concurrently, but each entry is only mutated by the owning context.
static CONTEXTS: Lazy<SkipMap<u64, Arc<LogTag>>> = Lazy::new(SkipMap::new);

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static CONTEXT_ID: Cell<u64> = const { Cell::new(0) };
}

/// Stable identity of the calling logical context, assigned on first use.
pub(crate) fn context_id() -> u64 {
    CONTEXT_ID.with(|slot| {
        let id = slot.get();
        if id != 0 {
            return id;
        }
        let id = NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed);
        slot.set(id);
        id
    })
}

struct TagInner {
    level: Level,
    keys: Vec<String>,
    values: Vec<String>,
    text: String,
    data: HashMap<String, String>,
    rebuild_text: bool,
    rebuild_data: bool,
}

impl TagInner {
    fn new() -> TagInner {
        TagInner {
            level: Level::Undefined,
            keys: Vec::new(),
            values: Vec::new(),
            text: String::new(),
            data: HashMap::new(),
            rebuild_text: true,
            rebuild_data: true,
        }
    }
}

/// Ordered key/value metadata attached to log records, with an optional
/// severity override that takes precedence over the engine-wide maximum.
///
/// All methods take `&self`; the state lives behind an internal lock so a
/// tag can be shared between the context map and its owner. A tag must not
/// be driven from two logical contexts at once — clone it with
/// [`LogTag::clone_tag`] instead of sharing.
pub struct LogTag {
    inner: Mutex<TagInner>,
}

impl LogTag {
    /// Create an empty, unpooled tag.
    pub fn new() -> LogTag {
        LogTag {
            inner: Mutex::new(TagInner::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TagInner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Bind `key` to `value`, replacing any previous binding (last write
    /// wins). Invalidates the rendered-text and map caches.
    pub fn set(&self, key: &str, value: &str) {
        let mut inner = self.lock();
        if let Some(index) = inner.keys.iter().position(|k| k == key) {
            inner.values[index] = value.to_string();
        } else {
            inner.keys.push(key.to_string());
            inner.values.push(value.to_string());
        }
        inner.rebuild_text = true;
        inner.rebuild_data = true;
    }

    /// Look up the value bound to `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        let inner = self.lock();
        inner
            .keys
            .iter()
            .position(|k| k == key)
            .map(|index| inner.values[index].clone())
    }

    /// Rendered form, `[k1=v1, k2=v2]`, or an empty string for an empty
    /// tag. Rebuilt lazily and cached until the next [`LogTag::set`].
    pub fn text(&self) -> String {
        let mut inner = self.lock();
        if inner.rebuild_text {
            inner.rebuild_text = false;
            inner.text.clear();
            if !inner.keys.is_empty() {
                let mut text = String::from("[");
                for (index, key) in inner.keys.iter().enumerate() {
                    if index > 0 {
                        text.push_str(", ");
                    }
                    text.push_str(key);
                    text.push('=');
                    text.push_str(&inner.values[index]);
                }
                text.push(']');
                inner.text = text;
            }
        }
        inner.text.clone()
    }

    /// Map view of the key/value pairs. Rebuilt lazily and cached until the
    /// next [`LogTag::set`].
    pub fn data(&self) -> HashMap<String, String> {
        let mut inner = self.lock();
        if inner.rebuild_data {
            inner.rebuild_data = false;
            let pairs: HashMap<String, String> = inner
                .keys
                .iter()
                .cloned()
                .zip(inner.values.iter().cloned())
                .collect();
            inner.data = pairs;
        }
        inner.data.clone()
    }

    /// Pool-allocated deep copy: same level override, all pairs re-applied.
    /// The copy can be mutated or handed to another context without
    /// aliasing this tag.
    pub fn clone_tag(&self) -> Arc<LogTag> {
        let copy = get_tag();
        let inner = self.lock();
        for (index, key) in inner.keys.iter().enumerate() {
            copy.set(key, &inner.values[index]);
        }
        copy.lock().level = inner.level;
        copy
    }

    /// Severity override, [`Level::Undefined`] when the tag inherits the
    /// engine-wide maximum.
    pub fn level(&self) -> Level {
        self.lock().level
    }

    /// Install a severity override for records gated through this tag.
    pub fn set_level(&self, level: Level) {
        self.lock().level = level;
    }

    /// Clear everything back to the pristine state; runs before the tag
    /// re-enters the pool.
    pub(crate) fn reset(&self) {
        let mut inner = self.lock();
        inner.level = Level::Undefined;
        inner.keys.clear();
        inner.values.clear();
        inner.text.clear();
        inner.data.clear();
        inner.rebuild_text = true;
        inner.rebuild_data = true;
    }
}

impl Default for LogTag {
    fn default() -> Self {
        LogTag::new()
    }
}

impl AsRef<LogTag> for LogTag {
    fn as_ref(&self) -> &LogTag {
        self
    }
}

/// Take a pristine tag out of the pool.
pub fn get_tag() -> Arc<LogTag> {
    TAG_POOL.acquire()
}

/// Return a tag to the pool. The tag is only recycled once this is the last
/// handle to it; live clones keep it out of circulation.
pub fn put_tag(tag: Arc<LogTag>) {
    if Arc::strong_count(&tag) == 1 {
        TAG_POOL.release(tag);
    }
}

/// Associate a tag with the calling context, replacing any previous
/// association. With `None` a fresh pooled tag is created. Returns the
/// associated tag.
pub fn watch(tag: Option<Arc<LogTag>>) -> Arc<LogTag> {
    let tag = tag.unwrap_or_else(get_tag);
    CONTEXTS.insert(context_id(), tag.clone());
    tag
}

/// The tag currently associated with the calling context, if any.
pub fn context_tag() -> Option<Arc<LogTag>> {
    CONTEXTS
        .get(&context_id())
        .map(|entry| entry.value().clone())
}

/// The calling context's tag with `pairs` applied, creating and associating
/// one first if the context has none.
pub fn tag_with(pairs: &[(&str, &str)]) -> Arc<LogTag> {
    let id = context_id();
    let tag = match CONTEXTS.get(&id) {
        Some(entry) => entry.value().clone(),
        None => {
            let tag = get_tag();
            CONTEXTS.insert(id, tag.clone());
            tag
        }
    };
    for (key, value) in pairs {
        tag.set(key, value);
    }
    tag
}

/// Detach the calling context's tag and return it to the pool. Call this
/// before the context ends; skipping it leaks the association.
pub fn defer() {
    if let Some(entry) = CONTEXTS.remove(&context_id()) {
        put_tag(entry.value().clone());
    }
}
