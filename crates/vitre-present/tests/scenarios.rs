// SPDX-License-Identifier: CEPL-1.0
//! End-to-end policy scenarios over constructed snapshots: the selection
//! and negotiation pipeline exactly as the presenter assembles it, short
//! of touching a real device.

use ash::vk;
use vitre_present::error::PresentError;
use vitre_present::negotiate::{negotiate, SurfaceConfig};
use vitre_present::probe::{self, DeviceCandidate, QueueFamily, SurfaceSupport};
use vitre_present::select::select_device;

fn candidate(
    name: &str,
    kind: vk::PhysicalDeviceType,
    geometry_shader: bool,
    families: &[(bool, bool)],
) -> DeviceCandidate {
    DeviceCandidate {
        handle: vk::PhysicalDevice::null(),
        kind,
        geometry_shader,
        name: name.into(),
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

fn support(
    formats: Vec<vk::SurfaceFormatKHR>,
    present_modes: Vec<vk::PresentModeKHR>,
) -> SurfaceSupport {
    SurfaceSupport {
        capabilities: vk::SurfaceCapabilitiesKHR {
            min_image_count: 2,
            max_image_count: 8,
            current_extent: vk::Extent2D {
                width: 1024,
                height: 728,
            },
            ..Default::default()
        },
        formats,
        present_modes,
    }
}

/// The presenter's policy sequence as a pure pipeline: a failed selection
/// means negotiation never runs and no configuration exists.
fn run_policy(
    candidates: &[DeviceCandidate],
    support: &SurfaceSupport,
    want: vk::Extent2D,
) -> Result<(usize, u32, SurfaceConfig), PresentError> {
    let (index, family) = select_device(candidates)?;
    let config = negotiate(support, want)?;
    Ok((index, family, config))
}

fn srgb() -> vk::SurfaceFormatKHR {
    vk::SurfaceFormatKHR {
        format: vk::Format::B8G8R8A8_SRGB,
        color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
    }
}

fn unorm() -> vk::SurfaceFormatKHR {
    vk::SurfaceFormatKHR {
        format: vk::Format::R8G8B8A8_UNORM,
        color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
    }
}

#[test]
fn preferred_hardware_takes_the_preferred_path() {
    let candidates = [
        candidate("igpu", vk::PhysicalDeviceType::INTEGRATED_GPU, false, &[(true, true)]),
        candidate("dgpu", vk::PhysicalDeviceType::DISCRETE_GPU, true, &[(true, true)]),
    ];
    let support = support(
        vec![srgb(), unorm()],
        vec![vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX],
    );

    let (index, family, config) = run_policy(
        &candidates,
        &support,
        vk::Extent2D {
            width: 1024,
            height: 728,
        },
    )
    .unwrap();

    assert_eq!(index, 1);
    assert_eq!(family, 0);
    assert_eq!(config.format.format, vk::Format::B8G8R8A8_SRGB);
    assert_eq!(config.format.color_space, vk::ColorSpaceKHR::SRGB_NONLINEAR);
    assert_eq!(config.present_mode, vk::PresentModeKHR::MAILBOX);
    assert_eq!(config.image_count, 3);
    assert_eq!((config.extent.width, config.extent.height), (1024, 728));
}

#[test]
fn modest_hardware_takes_every_fallback() {
    let candidates = [candidate(
        "igpu",
        vk::PhysicalDeviceType::INTEGRATED_GPU,
        false,
        &[(true, true)],
    )];
    let support = support(vec![unorm()], vec![vk::PresentModeKHR::FIFO]);

    let (index, _, config) = run_policy(
        &candidates,
        &support,
        vk::Extent2D {
            width: 1024,
            height: 728,
        },
    )
    .unwrap();

    assert_eq!(index, 0);
    assert_eq!(config.format.format, vk::Format::R8G8B8A8_UNORM);
    assert_eq!(config.present_mode, vk::PresentModeKHR::FIFO);
}

#[test]
fn no_presentable_queue_stops_the_pipeline_before_negotiation() {
    // Graphics without present and present without graphics: no family
    // qualifies, so selection fails and no configuration is built.
    let candidates = [candidate(
        "dgpu",
        vk::PhysicalDeviceType::DISCRETE_GPU,
        true,
        &[(true, false), (false, true)],
    )];
    let support = support(vec![srgb()], vec![vk::PresentModeKHR::FIFO]);

    let result = run_policy(
        &candidates,
        &support,
        vk::Extent2D {
            width: 1024,
            height: 728,
        },
    );
    assert!(matches!(result, Err(PresentError::NoPresentableQueue)));
}

#[test]
fn oversized_platform_results_are_rejected_outright() {
    let err = probe::ensure_bounded(
        "surface formats",
        probe::MAX_SURFACE_FORMATS + 8,
        probe::MAX_SURFACE_FORMATS,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        PresentError::UnsupportedConfiguration { count: 40, .. }
    ));
}
