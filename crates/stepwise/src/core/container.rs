//! Mount point populated by the external diagram renderer
//!
//! A [`Container`] is a cheap single-threaded handle. The renderer inserts
//! children into it; observers receive every structural change over an
//! unbounded channel. Closed observers are pruned on the next notification.
//! Output waiters get the first rendered child over a oneshot channel and
//! nothing else.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tokio::sync::{mpsc, oneshot};
use tracing::trace;

/// A child inserted into the container
pub enum ContainerChild<R> {
    /// The renderer's finished output
    Rendered(Rc<RefCell<R>>),
    /// Anything else (a loading message, an error banner)
    Placeholder(String),
}

impl<R> Clone for ContainerChild<R> {
    fn clone(&self) -> Self {
        match self {
            ContainerChild::Rendered(doc) => ContainerChild::Rendered(Rc::clone(doc)),
            ContainerChild::Placeholder(text) => ContainerChild::Placeholder(text.clone()),
        }
    }
}

impl<R> fmt::Debug for ContainerChild<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerChild::Rendered(_) => write!(f, "Rendered(..)"),
            ContainerChild::Placeholder(text) => write!(f, "Placeholder({:?})", text),
        }
    }
}

/// Structural change notification
pub enum Mutation<R> {
    ChildInserted(ContainerChild<R>),
    ChildrenCleared,
}

impl<R> Clone for Mutation<R> {
    fn clone(&self) -> Self {
        match self {
            Mutation::ChildInserted(child) => Mutation::ChildInserted(child.clone()),
            Mutation::ChildrenCleared => Mutation::ChildrenCleared,
        }
    }
}

impl<R> fmt::Debug for Mutation<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::ChildInserted(child) => write!(f, "ChildInserted({:?})", child),
            Mutation::ChildrenCleared => write!(f, "ChildrenCleared"),
        }
    }
}

/// Shared visibility flag of a container
#[derive(Debug, Clone)]
pub struct Visibility(Rc<Cell<bool>>);

impl Visibility {
    pub fn is_visible(&self) -> bool {
        self.0.get()
    }
}

struct ContainerInner<R> {
    id: String,
    visible: Rc<Cell<bool>>,
    children: RefCell<Vec<ContainerChild<R>>>,
    observers: RefCell<Vec<mpsc::UnboundedSender<Mutation<R>>>>,
    output_waiters: RefCell<Vec<oneshot::Sender<Rc<RefCell<R>>>>>,
}

/// Element the renderer draws into
pub struct Container<R> {
    inner: Rc<ContainerInner<R>>,
}

impl<R> Clone for Container<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<R> fmt::Debug for Container<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("id", &self.inner.id)
            .field("visible", &self.inner.visible.get())
            .field("children", &self.inner.children.borrow().len())
            .finish()
    }
}

impl<R> Container<R> {
    /// A visible, empty container
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(ContainerInner {
                id: id.into(),
                visible: Rc::new(Cell::new(true)),
                children: RefCell::new(Vec::new()),
                observers: RefCell::new(Vec::new()),
                output_waiters: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn is_visible(&self) -> bool {
        self.inner.visible.get()
    }

    pub fn set_visible(&self, visible: bool) {
        self.inner.visible.set(visible);
    }

    pub fn visibility(&self) -> Visibility {
        Visibility(Rc::clone(&self.inner.visible))
    }

    /// Insert the renderer's output; returns the shared handle to it
    pub fn insert_rendered(&self, output: R) -> Rc<RefCell<R>> {
        let output = Rc::new(RefCell::new(output));
        self.insert(ContainerChild::Rendered(Rc::clone(&output)));
        output
    }

    pub fn insert_placeholder(&self, text: impl Into<String>) {
        self.insert(ContainerChild::Placeholder(text.into()));
    }

    pub fn insert(&self, child: ContainerChild<R>) {
        self.inner.children.borrow_mut().push(child.clone());
        if let ContainerChild::Rendered(output) = &child {
            self.release_waiters(output);
        }
        self.notify(Mutation::ChildInserted(child));
    }

    /// Remove every child, dropping the container's hold on rendered output
    pub fn clear(&self) {
        self.inner.children.borrow_mut().clear();
        self.notify(Mutation::ChildrenCleared);
    }

    pub fn child_count(&self) -> usize {
        self.inner.children.borrow().len()
    }

    /// First rendered output currently present
    pub fn rendered(&self) -> Option<Rc<RefCell<R>>> {
        self.inner
            .children
            .borrow()
            .iter()
            .find_map(|child| match child {
                ContainerChild::Rendered(output) => Some(Rc::clone(output)),
                ContainerChild::Placeholder(_) => None,
            })
    }

    /// Subscribe to structural changes from now on
    pub fn observe(&self) -> mpsc::UnboundedReceiver<Mutation<R>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.observers.borrow_mut().push(tx);
        rx
    }

    /// Wait for the next rendered child
    ///
    /// The receiver gets exactly one value, or an error once the container
    /// is dropped. Placeholders and clears are never delivered.
    pub fn observe_output(&self) -> oneshot::Receiver<Rc<RefCell<R>>> {
        let (tx, rx) = oneshot::channel();
        let mut waiters = self.inner.output_waiters.borrow_mut();
        waiters.retain(|waiter| !waiter.is_closed());
        waiters.push(tx);
        rx
    }

    /// Live mutation observers and output waiters
    pub fn observer_count(&self) -> usize {
        let observers = self
            .inner
            .observers
            .borrow()
            .iter()
            .filter(|tx| !tx.is_closed())
            .count();
        let waiters = self
            .inner
            .output_waiters
            .borrow()
            .iter()
            .filter(|tx| !tx.is_closed())
            .count();
        observers + waiters
    }

    fn release_waiters(&self, output: &Rc<RefCell<R>>) {
        let waiters = std::mem::take(&mut *self.inner.output_waiters.borrow_mut());
        let delivered = waiters
            .into_iter()
            .filter_map(|waiter| waiter.send(Rc::clone(output)).ok())
            .count();
        trace!(container = %self.inner.id, delivered, "Output waiters released");
    }

    fn notify(&self, mutation: Mutation<R>) {
        let mut observers = self.inner.observers.borrow_mut();
        observers.retain(|tx| tx.send(mutation.clone()).is_ok());
        trace!(container = %self.inner.id, observers = observers.len(), ?mutation, "Container mutated");
    }
}
