//! Textures, samplers and image units
//!
//! Samplers are applied before (or together with) the textures sharing
//! their units.

use super::Context;
use crate::driver::Driver;
use crate::mirror::{MAX_RWTEXTURE_IMAGES, MAX_TEXTURE_IMAGES};
use keel_core::handle::{same, same_range};
use keel_core::resource::{SamplerAttribs, SamplerRef, TextureImageRef, TextureRef};
use keel_core::Resource;

impl<D: Driver> Context<D> {
    /// Bind `texture` to `unit` and record it.
    pub fn apply_texture(&mut self, texture: Option<&TextureRef>, unit: usize) {
        debug_assert!(
            unit < self.mirror.textures.len(),
            "texture unit {unit} out of range ({} units)",
            self.mirror.textures.len()
        );
        tracing::trace!(unit, texture = ?texture.map(|t| t.label()), "bind texture");
        self.driver.bind_texture(unit, texture.map(|t| &**t));
        self.mirror.textures[unit] = texture.cloned();
        self.note("texture.applied");
    }

    pub fn checked_texture(&mut self, texture: Option<&TextureRef>, unit: usize) -> bool {
        debug_assert!(unit < self.mirror.textures.len(), "texture unit {unit} out of range");
        if same(self.mirror.textures[unit].as_ref(), texture) {
            self.note("texture.skipped");
            return false;
        }
        self.apply_texture(texture, unit);
        true
    }

    /// Bind `textures` to the units starting at `start`.
    pub fn apply_textures(&mut self, textures: &[Option<TextureRef>], start: usize) {
        let num = textures.len();
        debug_assert!(
            (1..=MAX_TEXTURE_IMAGES).contains(&num),
            "texture range of {num} units"
        );
        debug_assert!(
            start + num <= self.mirror.textures.len(),
            "texture range {start}..{} out of range ({} units)",
            start + num,
            self.mirror.textures.len()
        );
        tracing::trace!(start, num, "bind textures");
        self.driver.bind_textures(start, textures);
        self.mirror.textures[start..start + num].clone_from_slice(textures);
        self.note("texture.applied");
    }

    /// Rebind the whole range if any unit in it differs.
    pub fn checked_textures(&mut self, textures: &[Option<TextureRef>], start: usize) -> bool {
        let end = start + textures.len();
        debug_assert!(
            (1..=MAX_TEXTURE_IMAGES).contains(&textures.len()),
            "texture range of {} units",
            textures.len()
        );
        debug_assert!(end <= self.mirror.textures.len(), "texture range {start}..{end} out of range");
        if same_range(&self.mirror.textures[start..end], textures) {
            self.note("texture.skipped");
            return false;
        }
        self.apply_textures(textures, start);
        true
    }

    pub fn apply_sampler(&mut self, sampler: Option<&SamplerRef>, unit: usize) {
        debug_assert!(
            unit < self.mirror.samplers.len(),
            "sampler unit {unit} out of range ({} units)",
            self.mirror.samplers.len()
        );
        tracing::trace!(unit, sampler = ?sampler.map(|s| s.label()), "bind sampler");
        self.driver.bind_sampler(unit, sampler.map(|s| &**s));
        self.mirror.samplers[unit] = sampler.cloned();
        self.note("sampler.applied");
    }

    pub fn checked_sampler(&mut self, sampler: Option<&SamplerRef>, unit: usize) -> bool {
        debug_assert!(unit < self.mirror.samplers.len(), "sampler unit {unit} out of range");
        if same(self.mirror.samplers[unit].as_ref(), sampler) {
            self.note("sampler.skipped");
            return false;
        }
        self.apply_sampler(sampler, unit);
        true
    }

    pub fn apply_samplers(&mut self, samplers: &[Option<SamplerRef>], start: usize) {
        let num = samplers.len();
        debug_assert!(
            (1..=MAX_TEXTURE_IMAGES).contains(&num),
            "sampler range of {num} units"
        );
        debug_assert!(
            start + num <= self.mirror.samplers.len(),
            "sampler range {start}..{} out of range ({} units)",
            start + num,
            self.mirror.samplers.len()
        );
        tracing::trace!(start, num, "bind samplers");
        self.driver.bind_samplers(start, samplers);
        self.mirror.samplers[start..start + num].clone_from_slice(samplers);
        self.note("sampler.applied");
    }

    pub fn checked_samplers(&mut self, samplers: &[Option<SamplerRef>], start: usize) -> bool {
        let end = start + samplers.len();
        debug_assert!(
            (1..=MAX_TEXTURE_IMAGES).contains(&samplers.len()),
            "sampler range of {} units",
            samplers.len()
        );
        debug_assert!(end <= self.mirror.samplers.len(), "sampler range {start}..{end} out of range");
        if same_range(&self.mirror.samplers[start..end], samplers) {
            self.note("sampler.skipped");
            return false;
        }
        self.apply_samplers(samplers, start);
        true
    }

    pub fn apply_texture_image(&mut self, image: Option<&TextureImageRef>, unit: usize) {
        debug_assert!(
            unit < self.mirror.images.len(),
            "image unit {unit} out of range ({} units)",
            self.mirror.images.len()
        );
        tracing::trace!(unit, image = ?image.map(|i| i.texture().label()), "bind texture image");
        self.driver.bind_texture_image(unit, image.map(|i| &**i));
        self.mirror.images[unit] = image.cloned();
        self.note("image.applied");
    }

    pub fn checked_texture_image(&mut self, image: Option<&TextureImageRef>, unit: usize) -> bool {
        debug_assert!(unit < self.mirror.images.len(), "image unit {unit} out of range");
        if same(self.mirror.images[unit].as_ref(), image) {
            self.note("image.skipped");
            return false;
        }
        self.apply_texture_image(image, unit);
        true
    }

    pub fn apply_texture_images(&mut self, images: &[Option<TextureImageRef>], start: usize) {
        let num = images.len();
        debug_assert!(
            (1..=MAX_RWTEXTURE_IMAGES).contains(&num),
            "image range of {num} units"
        );
        debug_assert!(
            start + num <= self.mirror.images.len(),
            "image range {start}..{} out of range ({} units)",
            start + num,
            self.mirror.images.len()
        );
        tracing::trace!(start, num, "bind texture images");
        self.driver.bind_texture_images(start, images);
        self.mirror.images[start..start + num].clone_from_slice(images);
        self.note("image.applied");
    }

    pub fn checked_texture_images(&mut self, images: &[Option<TextureImageRef>], start: usize) -> bool {
        let end = start + images.len();
        debug_assert!(
            (1..=MAX_RWTEXTURE_IMAGES).contains(&images.len()),
            "image range of {} units",
            images.len()
        );
        debug_assert!(end <= self.mirror.images.len(), "image range {start}..{end} out of range");
        if same_range(&self.mirror.images[start..end], images) {
            self.note("image.skipped");
            return false;
        }
        self.apply_texture_images(images, start);
        true
    }

    /// Make the texture bound at `unit` carry the parameters of the sampler
    /// bound at the same unit.
    ///
    /// Uses the texture's last-sampler hint (identity and incarnation), so a
    /// sampler respecified in place is copied again.
    pub fn checked_bound_texture_sampler(&mut self, unit: usize) -> bool {
        debug_assert!(unit < self.mirror.textures.len(), "texture unit {unit} out of range");
        let Some(texture) = self.mirror.textures[unit].clone() else {
            return false;
        };
        let sampler = self.mirror.samplers[unit].clone();
        if texture.sampler_matches(sampler.as_deref()) {
            self.note("texture_sampler.skipped");
            return false;
        }
        tracing::trace!(unit, texture = texture.label(), "copy sampler to texture");
        self.driver
            .copy_sampler_to_texture(&texture, sampler.as_deref(), SamplerAttribs::ALL);
        texture.record_sampler(sampler.as_deref());
        self.note("texture_sampler.applied");
        true
    }

    /// Unbind every texture, sampler and image unit that has something bound.
    pub fn clear_texture_state(&mut self) {
        tracing::debug!("clear texture state");
        for unit in 0..self.mirror.samplers.len() {
            if self.mirror.samplers[unit].is_some() {
                self.apply_sampler(None, unit);
            }
        }
        for unit in 0..self.mirror.textures.len() {
            if self.mirror.textures[unit].is_some() {
                self.apply_texture(None, unit);
            }
        }
        for unit in 0..self.mirror.images.len() {
            if self.mirror.images[unit].is_some() {
                self.apply_texture_image(None, unit);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::recording;
    use crate::driver::DriverCall;
    use keel_core::resource::{
        Filter, ImageAccess, Sampler, SamplerDesc, Texture, TextureDesc, TextureImage,
    };
    use keel_core::Resource;

    fn texture(label: &str) -> keel_core::resource::TextureRef {
        Texture::new(label, TextureDesc::default())
    }

    #[test]
    fn checked_texture_is_idempotent() {
        let mut ctx = recording(16);
        let a = texture("a");
        assert!(ctx.checked_texture(Some(&a), 3));
        assert!(!ctx.checked_texture(Some(&a), 3));
        assert!(!ctx.checked_texture(Some(&a.clone()), 3));
        assert_eq!(ctx.driver().len(), 1);
        assert_eq!(ctx.mirror().texture(3).map(|t| t.id()), Some(a.id()));
    }

    #[test]
    fn apply_always_reaches_the_driver() {
        let mut ctx = recording(16);
        let a = texture("a");
        ctx.apply_texture(Some(&a), 0);
        ctx.apply_texture(Some(&a), 0);
        assert_eq!(ctx.driver().len(), 2);
    }

    #[test]
    fn equal_parameters_are_still_different_textures() {
        let mut ctx = recording(16);
        let a = texture("a");
        let b = texture("a");
        ctx.checked_texture(Some(&a), 0);
        assert!(ctx.checked_texture(Some(&b), 0));
    }

    #[test]
    fn batch_short_circuits_on_equal_range() {
        let mut ctx = recording(16);
        let range = vec![Some(texture("a")), None, Some(texture("c"))];
        assert!(ctx.checked_textures(&range, 4));
        assert!(!ctx.checked_textures(&range, 4));
        assert_eq!(ctx.driver().len(), 1);
    }

    #[test]
    fn batch_reapplies_whole_range_on_single_difference() {
        let mut ctx = recording(16);
        let mut range = vec![Some(texture("a")), Some(texture("b")), Some(texture("c"))];
        ctx.checked_textures(&range, 0);
        ctx.driver_mut().clear();

        range[1] = Some(texture("b2"));
        assert!(ctx.checked_textures(&range, 0));
        match &ctx.driver().calls()[0] {
            DriverCall::BindTextures { start, textures } => {
                assert_eq!(*start, 0);
                assert_eq!(textures.len(), 3);
            }
            other => panic!("unexpected call {other:?}"),
        }
        assert!(ctx.check_states());
    }

    #[test]
    fn sampler_batch_reapplies_whole_range_on_single_difference() {
        let mut ctx = recording(16);
        let linear = Sampler::new("linear", SamplerDesc::default());
        let mut range = vec![Some(linear.clone()), Some(linear.clone()), None];
        ctx.checked_samplers(&range, 2);
        ctx.driver_mut().clear();

        assert!(!ctx.checked_samplers(&range, 2));
        range[2] = Some(Sampler::new("shadow", SamplerDesc::default()));
        assert!(ctx.checked_samplers(&range, 2));
        assert_eq!(
            ctx.driver().calls(),
            &[DriverCall::BindSamplers {
                start: 2,
                samplers: range.iter().map(|s| s.as_ref().map(|s| s.id())).collect(),
            }]
        );
        assert!(ctx.check_states());
    }

    #[test]
    fn image_batch_reapplies_whole_range_on_single_difference() {
        let mut ctx = recording(16);
        let image = |label| Some(TextureImage::new(texture(label), 0, None, ImageAccess::ReadWrite));
        let mut range = vec![image("a"), image("b")];
        ctx.checked_texture_images(&range, 0);
        ctx.driver_mut().clear();

        range[0] = image("a2");
        assert!(ctx.checked_texture_images(&range, 0));
        match &ctx.driver().calls()[..] {
            [DriverCall::BindTextureImages { start: 0, images }] => assert_eq!(images.len(), 2),
            other => panic!("unexpected calls {other:?}"),
        }
        assert!(ctx.check_states());
    }

    #[test]
    #[should_panic(expected = "range of 0 units")]
    #[cfg(debug_assertions)]
    fn empty_checked_range_is_rejected() {
        let mut ctx = recording(16);
        ctx.checked_samplers(&[], 0);
    }

    #[test]
    fn samplers_and_images_track_their_own_tables() {
        let mut ctx = recording(16);
        let s = Sampler::new("linear", SamplerDesc::default());
        let img = TextureImage::new(texture("rw"), 0, None, ImageAccess::ReadWrite);
        assert!(ctx.checked_sampler(Some(&s), 1));
        assert!(ctx.checked_texture_image(Some(&img), 1));
        assert!(ctx.mirror().texture(1).is_none());
        assert!(!ctx.checked_samplers(&[Some(s.clone())], 1));
        assert!(!ctx.checked_texture_images(&[Some(img.clone())], 1));
        assert!(ctx.check_states());
    }

    #[test]
    fn bound_sampler_copied_once_per_incarnation() {
        let mut ctx = recording(16);
        let t = texture("t");
        let s = Sampler::new("s", SamplerDesc::default());
        ctx.apply_sampler(Some(&s), 0);
        ctx.apply_texture(Some(&t), 0);

        assert!(ctx.checked_bound_texture_sampler(0));
        assert!(!ctx.checked_bound_texture_sampler(0));

        s.update(|d| d.mag_filter = Filter::Nearest);
        assert!(ctx.checked_bound_texture_sampler(0));
        assert_eq!(t.last_sampler(), Some(s.id()));
        assert_eq!(t.last_sampler_incarnation(), s.incarnation());

        let copies = ctx
            .driver()
            .count(|c| matches!(c, DriverCall::CopySamplerToTexture { .. }));
        assert_eq!(copies, 2);
    }

    #[test]
    fn bound_sampler_without_texture_is_a_no_op() {
        let mut ctx = recording(16);
        let s = Sampler::new("s", SamplerDesc::default());
        ctx.apply_sampler(Some(&s), 5);
        assert!(!ctx.checked_bound_texture_sampler(5));
    }

    #[test]
    fn clear_unbinds_only_occupied_units() {
        let mut ctx = recording(16);
        ctx.apply_texture(Some(&texture("a")), 2);
        ctx.apply_texture(Some(&texture("b")), 9);
        ctx.driver_mut().clear();

        ctx.clear_texture_state();
        assert_eq!(ctx.driver().len(), 2);
        assert!(ctx.mirror().textures().iter().all(Option::is_none));
        assert!(ctx.check_states());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    #[cfg(debug_assertions)]
    fn unit_past_capacity_is_rejected() {
        let mut ctx = recording(4);
        ctx.apply_texture(Some(&texture("a")), 4);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    #[cfg(debug_assertions)]
    fn range_past_capacity_is_rejected() {
        let mut ctx = recording(4);
        let range = vec![None, None, None];
        ctx.apply_textures(&range, 2);
    }
}
