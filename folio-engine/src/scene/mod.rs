// scene/ - 3D backend (three.js) access
//
// The backend is an ES module imported at runtime, so nothing here links
// against it statically. Classes are looked up on the module object and
// constructed through Reflect; the returned objects are driven through the
// typed method bindings in `bindings`.

mod backend;
mod bindings;
mod viewport;

pub use backend::{Three, js, load, params};
pub use bindings::*;
pub use viewport::{Lens, Surface, Viewport};
