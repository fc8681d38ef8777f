// SPDX-License-Identifier: CEPL-1.0
//! Device and queue selection policy.

use ash::vk;
use tracing::info;

use crate::error::{PresentError, PresentResult};
use crate::probe::DeviceCandidate;

/// Pick a device and the queue family that will own both rendering and
/// presentation, as `(candidate index, family index)`.
///
/// Preference order: the first discrete GPU reporting geometry-shader
/// support, then the first enumerated device of any kind. Within the chosen
/// device the first family that is graphics-capable and can present to the
/// surface wins; there is no separate-present-queue path.
pub fn select_device(candidates: &[DeviceCandidate]) -> PresentResult<(usize, u32)> {
    if candidates.is_empty() {
        return Err(PresentError::NoCompatibleDevice);
    }

    let index = candidates
        .iter()
        .position(|c| c.kind == vk::PhysicalDeviceType::DISCRETE_GPU && c.geometry_shader)
        .unwrap_or(0);
    let chosen = &candidates[index];

    let family = chosen
        .families
        .iter()
        .find(|f| f.graphics && f.present)
        .map(|f| f.index)
        .ok_or(PresentError::NoPresentableQueue)?;

    info!("using device: {} (queue family {family})", chosen.name);
    Ok((index, family))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::QueueFamily;

    fn candidate(
        kind: vk::PhysicalDeviceType,
        geometry_shader: bool,
        families: &[(bool, bool)],
    ) -> DeviceCandidate {
        DeviceCandidate {
            handle: vk::PhysicalDevice::null(),
            kind,
            geometry_shader,
            name: "test gpu".into(),
            families: families
                .iter()
                .enumerate()
                .map(|(i, &(graphics, present))| QueueFamily {
                    index: i as u32,
                    graphics,
                    present,
                })
                .collect(),
        }
    }

    #[test]
    fn empty_enumeration_is_an_error() {
        assert!(matches!(
            select_device(&[]),
            Err(PresentError::NoCompatibleDevice)
        ));
    }

    #[test]
    fn discrete_with_geometry_shader_beats_an_earlier_integrated() {
        let list = [
            candidate(vk::PhysicalDeviceType::INTEGRATED_GPU, false, &[(true, true)]),
            candidate(vk::PhysicalDeviceType::DISCRETE_GPU, true, &[(true, true)]),
        ];
        assert_eq!(select_device(&list).unwrap(), (1, 0));
    }

    #[test]
    fn discrete_without_geometry_shader_is_not_preferred() {
        let list = [
            candidate(vk::PhysicalDeviceType::INTEGRATED_GPU, false, &[(true, true)]),
            candidate(vk::PhysicalDeviceType::DISCRETE_GPU, false, &[(true, true)]),
        ];
        assert_eq!(select_device(&list).unwrap(), (0, 0));
    }

    #[test]
    fn family_must_have_both_graphics_and_present() {
        // graphics-only, present-only, then the first family wearing both
        let list = [candidate(
            vk::PhysicalDeviceType::DISCRETE_GPU,
            true,
            &[(true, false), (false, true), (true, true)],
        )];
        assert_eq!(select_device(&list).unwrap(), (0, 2));
    }

    #[test]
    fn no_presentable_family_fails_selection() {
        let list = [candidate(
            vk::PhysicalDeviceType::DISCRETE_GPU,
            true,
            &[(true, false), (false, true)],
        )];
        assert!(matches!(
            select_device(&list),
            Err(PresentError::NoPresentableQueue)
        ));
    }

    #[test]
    fn selection_is_deterministic() {
        let list = [
            candidate(vk::PhysicalDeviceType::CPU, false, &[(true, true)]),
            candidate(vk::PhysicalDeviceType::DISCRETE_GPU, true, &[(false, false), (true, true)]),
        ];
        let first = select_device(&list).unwrap();
        for _ in 0..4 {
            assert_eq!(select_device(&list).unwrap(), first);
        }
    }
}
