/// Teardown hooks run exactly once, in reverse registration order.
#[derive(Default)]
pub struct DisposeBag {
    hooks: Vec<(&'static str, Box<dyn FnOnce()>)>,
    disposed: bool,
}

impl DisposeBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `hook`. After `dispose` it runs immediately instead.
    pub fn push(&mut self, label: &'static str, hook: impl FnOnce() + 'static) {
        if self.disposed {
            log::debug!("[lifecycle] {} registered after dispose; running now", label);
            hook();
            return;
        }
        self.hooks.push((label, Box::new(hook)));
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        while let Some((label, hook)) = self.hooks.pop() {
            log::debug!("[lifecycle] dispose {}", label);
            hook();
        }
    }
}

impl std::fmt::Debug for DisposeBag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisposeBag")
            .field("hooks", &self.hooks.iter().map(|(l, _)| *l).collect::<Vec<_>>())
            .field("disposed", &self.disposed)
            .finish()
    }
}
