use std::path::{Path, PathBuf};

use derivative::Derivative;
use fxhash::FxHashMap;
use image::RgbaImage;
use log::debug;

use crate::TextureError;

/// Reference-counted cache of decoded textures, keyed by their paths.
///
/// Created once and passed into each material-library parse, so that models
/// sharing a texture also share the decoded image (and its id).
#[derive(Debug, Default)]
pub struct TextureCache {
    bindless: bool,
    paths: FxHashMap<PathBuf, TextureHandle>,
    textures: FxHashMap<TextureHandle, CachedTexture>,
    free_ids: Vec<TextureId>,
    next_handle: u32,
    next_id: u32,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decides whether textures acquired from now on can be addressed
    /// bindlessly (see [`Self::bindless_handle()`]).
    pub fn with_bindless(mut self, bindless: bool) -> Self {
        self.bindless = bindless;
        self
    }

    /// Loads the texture at `path`, or - if it's been already loaded - bumps
    /// its reference count and returns the existing handle.
    pub fn acquire(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<TextureHandle, TextureError> {
        let path = path.as_ref();

        if let Some(&handle) = self.paths.get(path) {
            if let Some(texture) = self.textures.get_mut(&handle) {
                texture.refs += 1;
                return Ok(handle);
            }
        }

        let image = image::open(path)
            .map_err(|source| TextureError::Load {
                path: path.to_owned(),
                source,
            })?
            .to_rgba8();

        let id = self.free_ids.pop().unwrap_or_else(|| {
            self.next_id += 1;
            TextureId::new(self.next_id - 1)
        });

        let handle = TextureHandle::new(self.next_handle);

        self.next_handle += 1;

        debug!(
            "Loaded texture `{}` ({}x{}) as {:?}",
            path.display(),
            image.width(),
            image.height(),
            id
        );

        self.paths.insert(path.to_owned(), handle);

        self.textures.insert(
            handle,
            CachedTexture {
                path: path.to_owned(),
                id,
                refs: 1,
                bindless: self.bindless,
                image,
            },
        );

        Ok(handle)
    }

    /// Drops one reference; once there are none left, the texture gets
    /// unloaded and its id becomes available for reuse.
    pub fn release(&mut self, handle: TextureHandle) -> Result<(), TextureError> {
        let texture = self
            .textures
            .get_mut(&handle)
            .ok_or(TextureError::UnknownHandle(handle))?;

        texture.refs -= 1;

        if texture.refs == 0 {
            if let Some(texture) = self.textures.remove(&handle) {
                debug!("Unloaded texture `{}`", texture.path.display());

                self.paths.remove(&texture.path);
                self.free_ids.push(texture.id);
            }
        }

        Ok(())
    }

    pub fn id(&self, handle: TextureHandle) -> Result<TextureId, TextureError> {
        self.get(handle).map(|texture| texture.id)
    }

    pub fn bindless_handle(
        &self,
        handle: TextureHandle,
    ) -> Result<u64, TextureError> {
        let texture = self.get(handle)?;

        if texture.bindless {
            Ok(u64::from(texture.id.get()))
        } else {
            Err(TextureError::NotBindless(handle))
        }
    }

    pub fn image(&self, handle: TextureHandle) -> Option<&RgbaImage> {
        self.textures.get(&handle).map(|texture| &texture.image)
    }

    /// Returns how many references there are to given texture (zero if it's
    /// not loaded).
    pub fn refs(&self, handle: TextureHandle) -> usize {
        self.textures.get(&handle).map_or(0, |texture| texture.refs)
    }

    /// Iterates over all of the loaded textures, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (TextureId, &RgbaImage)> + '_ {
        self.textures
            .values()
            .map(|texture| (texture.id, &texture.image))
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    fn get(&self, handle: TextureHandle) -> Result<&CachedTexture, TextureError> {
        self.textures
            .get(&handle)
            .ok_or(TextureError::UnknownHandle(handle))
    }
}

#[derive(Derivative)]
#[derivative(Debug)]
struct CachedTexture {
    path: PathBuf,
    id: TextureId,
    refs: usize,
    bindless: bool,
    #[derivative(Debug = "ignore")]
    image: RgbaImage,
}

/// Opaque handle to a texture held by the [`TextureCache`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(u32);

impl TextureHandle {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Texture's identifier as seen by the intersection stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(u32);

impl TextureId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    fn write_png(dir: &Path, name: &str, size: u32) -> PathBuf {
        let path = dir.join(name);

        RgbaImage::from_pixel(size, size, Rgba([255, 0, 0, 255]))
            .save(&path)
            .unwrap();

        path
    }

    #[test]
    fn acquire_and_release() {
        let dir = tempfile::tempdir().unwrap();
        let brick = write_png(dir.path(), "brick.png", 2);
        let grass = write_png(dir.path(), "grass.png", 4);

        let mut target = TextureCache::new();

        let brick1 = target.acquire(&brick).unwrap();
        let brick2 = target.acquire(&brick).unwrap();
        let grass1 = target.acquire(&grass).unwrap();

        assert_eq!(brick1, brick2);
        assert_ne!(brick1, grass1);
        assert_eq!(2, target.len());
        assert_eq!(2, target.refs(brick1));
        assert_eq!(1, target.refs(grass1));
        assert_eq!(TextureId::new(0), target.id(brick1).unwrap());
        assert_eq!(TextureId::new(1), target.id(grass1).unwrap());
        assert_eq!(4, target.image(grass1).unwrap().width());

        target.release(brick1).unwrap();

        assert_eq!(1, target.refs(brick1));
        assert!(target.image(brick1).is_some());

        target.release(brick1).unwrap();

        assert_eq!(0, target.refs(brick1));
        assert!(target.image(brick1).is_none());
        assert!(matches!(
            target.id(brick1),
            Err(TextureError::UnknownHandle(_))
        ));
        assert!(matches!(
            target.release(brick1),
            Err(TextureError::UnknownHandle(_))
        ));

        // Freed id gets reused, but the handle doesn't
        let brick3 = target.acquire(&brick).unwrap();

        assert_ne!(brick1, brick3);
        assert_eq!(TextureId::new(0), target.id(brick3).unwrap());
        assert_eq!(2, target.iter().count());
    }

    #[test]
    fn bindless() {
        let dir = tempfile::tempdir().unwrap();
        let brick = write_png(dir.path(), "brick.png", 2);
        let grass = write_png(dir.path(), "grass.png", 2);

        let mut target = TextureCache::new();
        let brick = target.acquire(&brick).unwrap();

        assert!(matches!(
            target.bindless_handle(brick),
            Err(TextureError::NotBindless(_))
        ));

        let mut target = target.with_bindless(true);
        let grass = target.acquire(&grass).unwrap();

        assert_eq!(1, target.bindless_handle(grass).unwrap());
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut target = TextureCache::new();
        let err = target.acquire(dir.path().join("nope.png")).unwrap_err();

        assert!(matches!(err, TextureError::Load { .. }), "{err:?}");
        assert!(target.is_empty());
    }
}
