//! Background asset loading.
//!
//! Each request decodes on its own worker thread. Finished loads queue up on
//! a channel until the frame loop drains them with [`AssetLoader::poll`], so
//! every result is applied on the thread that owns the scene.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use crate::assets::loaders::{load_image, load_model};
use crate::assets::model::ModelAsset;
use crate::errors::Result;
use crate::scene::Image;

/// What a finished load is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetSlot {
    Background,
    Environment,
    /// The character model; its first clip is the idle animation.
    CharacterIdle,
    /// Only the first clip of this file is used.
    CharacterDance,
}

impl AssetSlot {
    #[must_use]
    pub fn is_image(self) -> bool {
        matches!(self, AssetSlot::Background)
    }
}

#[derive(Debug)]
pub enum LoadedAsset {
    Model(ModelAsset),
    Image(Image),
}

#[derive(Debug)]
pub struct LoadEvent {
    pub slot: AssetSlot,
    pub path: PathBuf,
    pub result: Result<LoadedAsset>,
}

pub struct AssetLoader {
    sender: flume::Sender<LoadEvent>,
    receiver: flume::Receiver<LoadEvent>,
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetLoader {
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        Self { sender, receiver }
    }

    /// Starts loading `path` for `slot` in the background.
    pub fn request(&self, slot: AssetSlot, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        log::info!("Loading {slot:?} from {}", path.display());

        let sender = self.sender.clone();
        let worker_path = path.clone();
        let spawned = thread::Builder::new()
            .name(format!("asset-{slot:?}"))
            .spawn(move || {
                let result = decode(slot, &worker_path);
                // The receiver is gone only when the app is shutting down.
                let _ = sender.send(LoadEvent {
                    slot,
                    path: worker_path,
                    result,
                });
            });

        if let Err(err) = spawned {
            let _ = self.sender.send(LoadEvent {
                slot,
                path,
                result: Err(err.into()),
            });
        }
    }

    /// Completed loads, in completion order. Never blocks.
    #[must_use]
    pub fn poll(&self) -> Vec<LoadEvent> {
        self.receiver.try_iter().collect()
    }

    /// Waits up to `timeout` for the next completed load.
    #[must_use]
    pub fn wait_next(&self, timeout: Duration) -> Option<LoadEvent> {
        self.receiver.recv_timeout(timeout).ok()
    }
}

fn decode(slot: AssetSlot, path: &Path) -> Result<LoadedAsset> {
    if slot.is_image() {
        load_image(path).map(LoadedAsset::Image)
    } else {
        load_model(path).map(LoadedAsset::Model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ViewerError;

    #[test]
    fn failed_load_is_delivered_as_event() {
        let loader = AssetLoader::new();
        loader.request(AssetSlot::Environment, "no/such/forest.glb");

        let event = loader.wait_next(Duration::from_secs(5)).unwrap();
        assert_eq!(event.slot, AssetSlot::Environment);
        assert!(matches!(event.result, Err(ViewerError::AssetNotFound(_))));
        assert!(loader.poll().is_empty());
    }
}
