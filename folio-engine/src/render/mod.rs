// render/ - Scene graphs for the two animation phases
//
// Each phase builds its own resources on its own surface and releases them
// itself. Nothing is shared between the phases except the backend module.

mod ambient;
mod intro;

pub use ambient::AmbientScene;
pub use intro::IntroScene;

use crate::scene::Disposable;

/// GPU-backed resources owned by one phase.
#[derive(Default)]
pub struct Resources {
    items: Vec<Disposable>,
}

impl Resources {
    /// Track `item` for release and hand it back.
    pub fn keep(&mut self, item: Disposable) -> Disposable {
        self.items.push(item.clone());
        item
    }

    pub fn release(self) {
        for item in self.items {
            item.dispose();
        }
    }
}
