//! Module loading and handler invocation.
//!
//! A module is a table of named callables keyed by its reference string.
//! The loading strategy is behind [`ModuleLoader`] so hosts can swap the
//! in-process [`ModuleDirectory`] for a network- or bundle-backed loader.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::Result;
use futures_util::future::LocalBoxFuture;
use futures_util::FutureExt;
use url::Url;

use crate::error::DispatchError;
use crate::eval::Value;

/// A handler exported by a module. Invocations may suspend; results cross
/// the boundary as `anyhow::Result` and are logged by the dispatcher.
pub type Callable = Rc<dyn Fn(Vec<Value>) -> LocalBoxFuture<'static, Result<()>>>;

/// Wrap a synchronous closure as a [`Callable`].
pub fn callable<F>(function: F) -> Callable
where
    F: Fn(Vec<Value>) -> Result<()> + 'static,
{
    Rc::new(move |args| std::future::ready(function(args)).boxed_local())
}

/// Wrap an async closure as a [`Callable`].
pub fn async_callable<F, Fut>(function: F) -> Callable
where
    F: Fn(Vec<Value>) -> Fut + 'static,
    Fut: std::future::Future<Output = Result<()>> + 'static,
{
    Rc::new(move |args| function(args).boxed_local())
}

/// A loaded code unit: named exports, nothing else.
#[derive(Default)]
pub struct Module {
    exports: HashMap<String, Callable>,
}

impl std::fmt::Debug for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Module")
            .field("exports", &self.exports.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn export(mut self, name: impl Into<String>, handler: Callable) -> Self {
        self.exports.insert(name.into(), handler);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Callable> {
        self.exports.get(name)
    }
}

/// Builds a module's export table on first load.
pub type ModuleFactory = Rc<dyn Fn() -> Result<Module>>;

/// The host's dynamic-loading mechanism.
///
/// Loading may suspend the calling task. Implementations provide
/// at-most-once load semantics per distinct reference; the engine keeps no
/// cache of its own.
pub trait ModuleLoader {
    fn load(&self, reference: &str) -> LocalBoxFuture<'static, Result<Rc<Module>, DispatchError>>;

    /// Hint that `reference` will be needed soon. No functional contract.
    fn preload(&self, reference: &str) {
        let _ = reference;
    }
}

/// In-process [`ModuleLoader`]: references map to registered factories.
///
/// The first successful load caches the module; later loads return the
/// cached handle. Failed loads are not cached, so a later reference
/// retries the factory.
#[derive(Clone, Default)]
pub struct ModuleDirectory {
    inner: Rc<DirectoryInner>,
}

#[derive(Default)]
struct DirectoryInner {
    base: Option<Url>,
    factories: RefCell<HashMap<String, ModuleFactory>>,
    loaded: RefCell<HashMap<String, Rc<Module>>>,
}

impl ModuleDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative references against `base` before lookup.
    pub fn with_base(base: Url) -> Self {
        Self {
            inner: Rc::new(DirectoryInner {
                base: Some(base),
                factories: RefCell::new(HashMap::new()),
                loaded: RefCell::new(HashMap::new()),
            }),
        }
    }

    pub fn register<F>(&self, reference: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<Module> + 'static,
    {
        self.inner
            .factories
            .borrow_mut()
            .insert(reference.into(), Rc::new(factory));
    }

    pub fn is_loaded(&self, reference: &str) -> bool {
        self.inner.loaded.borrow().contains_key(&self.resolve(reference))
    }

    fn resolve(&self, reference: &str) -> String {
        match &self.inner.base {
            Some(base) => resolve_reference(reference, base),
            None => reference.to_string(),
        }
    }

    fn load_now(&self, reference: &str) -> Result<Rc<Module>, DispatchError> {
        let key = self.resolve(reference);

        if let Some(module) = self.inner.loaded.borrow().get(&key) {
            tracing::debug!(target: "domwire", reference = %key, "module cache hit");
            return Ok(Rc::clone(module));
        }

        let factory = self.inner.factories.borrow().get(&key).cloned();
        let factory = factory.ok_or_else(|| DispatchError::Load {
            reference: key.clone(),
            source: anyhow::anyhow!("no module registered for reference"),
        })?;

        let module = factory().map_err(|source| DispatchError::Load {
            reference: key.clone(),
            source,
        })?;
        let module = Rc::new(module);
        self.inner
            .loaded
            .borrow_mut()
            .insert(key.clone(), Rc::clone(&module));
        tracing::debug!(target: "domwire", reference = %key, "module loaded");
        Ok(module)
    }
}

impl ModuleLoader for ModuleDirectory {
    fn load(&self, reference: &str) -> LocalBoxFuture<'static, Result<Rc<Module>, DispatchError>> {
        let directory = self.clone();
        let reference = reference.to_string();
        async move { directory.load_now(&reference) }.boxed_local()
    }

    fn preload(&self, reference: &str) {
        if let Err(error) = self.load_now(reference) {
            tracing::debug!(target: "domwire", reference, error = %error, "preload skipped");
        }
    }
}

/// Resolve a module reference against a base URL. Absolute references pass
/// through untouched.
pub fn resolve_reference(reference: &str, base: &Url) -> String {
    if reference.starts_with("http://")
        || reference.starts_with("https://")
        || reference.starts_with("file://")
    {
        return reference.to_string();
    }

    match base.join(reference) {
        Ok(resolved) => resolved.to_string(),
        Err(error) => {
            tracing::warn!(
                target: "domwire",
                reference,
                error = %error,
                "failed to resolve module reference"
            );
            reference.to_string()
        }
    }
}

/// Load `module`, resolve `function`, and invoke it with `args` in order.
pub async fn execute(
    loader: &dyn ModuleLoader,
    module: &str,
    function: &str,
    args: Vec<Value>,
) -> Result<(), DispatchError> {
    let loaded = loader.load(module).await?;

    let handler = loaded
        .get(function)
        .cloned()
        .ok_or_else(|| DispatchError::Resolution {
            module: module.to_string(),
            function: function.to_string(),
        })?;

    handler(args).await.map_err(|source| DispatchError::Invocation {
        module: module.to_string(),
        function: function.to_string(),
        source,
    })
}
