//! End-to-end scenarios for the configuration model.
//!
//! These tests drive the model exclusively through its public API, the same
//! way the editor session does: build an [`EditorState`], apply commands, and
//! read the derived getters.

use signage_core::domain::geometry;
use signage_core::{
    Asset, AssetCatalog, AssetMetadata, Command, Config, ConfigField, DeviceLayout, EditorState,
    FileType, Rotation, MAX_UNITS,
};

fn catalog(entries: &[(&str, FileType, Option<f64>)]) -> AssetCatalog {
    entries
        .iter()
        .map(|&(id, filetype, duration)| {
            (
                id.to_string(),
                Asset {
                    id: id.to_string(),
                    thumb: format!("https://cdn.example/{id}.jpg"),
                    filetype,
                    metadata: AssetMetadata { duration },
                },
            )
        })
        .collect()
}

fn apply_all(state: EditorState, commands: &[Command]) -> EditorState {
    commands.iter().fold(state, |s, c| s.apply(c))
}

#[test]
fn test_size_matches_first_group_units_for_mixed_layouts() {
    let mut state = apply_all(
        EditorState::default(),
        &[
            Command::AddAssignment { screens: 3 },
            Command::AddAssignment { screens: 3 },
        ],
    );
    state.config.assignments[0].devices[2].layout = DeviceLayout::Double;
    state.config.assignments[1].devices[0].layout = DeviceLayout::Double;

    let expected: u32 = state.config.assignments[0]
        .devices
        .iter()
        .map(|d| match d.layout {
            DeviceLayout::Single => 1,
            DeviceLayout::Double => 2,
        })
        .sum();
    assert_eq!(state.config.size(), expected);
    assert_eq!(state.config.size(), 4);
}

#[test]
fn test_geometry_table_layouts_all_sum_to_size() {
    for n in 0..=MAX_UNITS {
        assert!(geometry::layouts(n)
            .unwrap()
            .iter()
            .all(|layout| layout.iter().sum::<u32>() == n));
    }
}

#[test]
fn test_empty_config_add_two_screen_group() {
    let state = EditorState::default().apply(&Command::AddAssignment { screens: 2 });

    assert_eq!(state.config.assignments[0].devices.len(), 2);
    assert_eq!(state.config.size(), 2);
    assert_eq!(state.config.layouts().unwrap(), vec![vec![1, 1], vec![2]]);
}

#[test]
fn test_add_item_on_size_two_yields_two_blank_slots() {
    let state = apply_all(
        EditorState::default(),
        &[
            Command::AddAssignment { screens: 2 },
            Command::AddItem { layout: vec![1, 1] },
        ],
    );

    let item = &state.config.playlist[0];
    assert_eq!(item.content.len(), 2);
    assert!(item.content.iter().all(|slot| slot.file.is_none()));
    assert_eq!(item.duration, 10.0);
}

#[test]
fn test_assigned_video_produces_suggestion() {
    let state = EditorState {
        assets: catalog(&[("vid1", FileType::Video, Some(7.5))]),
        ..EditorState::default()
    };

    let state = apply_all(
        state,
        &[
            Command::AddAssignment { screens: 2 },
            Command::AddItem { layout: vec![2] },
            Command::AssignAsset {
                item_idx: 0,
                slot_idx: 0,
                asset_id: "vid1".to_string(),
            },
        ],
    );

    let item = &state.config.playlist[0];
    assert_eq!(state.suggested_duration(item), Some(7.5));

    // Taking the suggestion makes it disappear.
    let state = state.apply(&Command::UpdateDuration {
        item_idx: 0,
        duration: 7.5,
    });
    assert_eq!(state.suggested_duration(&state.config.playlist[0]), None);
}

#[test]
fn test_delete_only_group_of_three_wipes_playlist() {
    let state = apply_all(
        EditorState::default(),
        &[
            Command::AddAssignment { screens: 3 },
            Command::AddItem { layout: vec![1, 1, 1] },
            Command::AddItem { layout: vec![2, 1] },
            Command::AddItem { layout: vec![3] },
        ],
    );
    assert_eq!(state.config.assignments[0].devices.len(), 3);

    let state = state.apply(&Command::DeleteAssignment { assignment_idx: 0 });

    assert!(state.config.assignments.is_empty());
    assert!(state.config.playlist.is_empty());
}

#[test]
fn test_rotation_flips_ratio_and_row_height() {
    let upright = EditorState::default().apply(&Command::AddAssignment { screens: 2 });
    let rotated = upright.apply(&Command::SetConfig(ConfigField::Rotation(Rotation::Deg90)));

    let r0 = upright.config.screen_ratio();
    let r90 = rotated.config.screen_ratio();
    assert!((r90 - 1.0 / r0).abs() < 1e-12);
    assert!(rotated.config.row_height().unwrap() > upright.config.row_height().unwrap());
}

#[test]
fn test_group_resize_leaves_existing_items_stale_but_intact() {
    let mut state = apply_all(
        EditorState::default(),
        &[
            Command::AddAssignment { screens: 2 },
            Command::AddItem { layout: vec![1, 1] },
        ],
    );

    // Turning the first device into a double grows the canvas to 3 units.
    state.config.assignments[0].devices[0].layout = DeviceLayout::Double;

    let item = &state.config.playlist[0];
    assert_eq!(state.config.size(), 3);
    assert!(!item.fits(state.config.size()));
    assert_eq!(item.layout(), vec![1, 1]);
}

#[test]
fn test_persisted_document_survives_json_round_trip_with_sentinel() {
    let state = apply_all(
        EditorState {
            assets: catalog(&[("img7", FileType::Image, None)]),
            ..EditorState::default()
        },
        &[
            Command::AddAssignment { screens: 2 },
            Command::AddItem { layout: vec![1, 1] },
            Command::AssignAsset {
                item_idx: 0,
                slot_idx: 1,
                asset_id: "img7".to_string(),
            },
            Command::SetConfig(ConfigField::Audio(true)),
        ],
    );

    let text = serde_json::to_string(&state.config).unwrap();
    assert!(text.contains("\"empty.png\""));

    let restored: Config = serde_json::from_str(&text).unwrap();
    assert_eq!(restored, state.config);
}
