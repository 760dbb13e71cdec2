use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use laplace_helper::{
    ExportOutcome, Exporter, InputSet, PresetPicker, Session, SessionConfig,
    derivation::{self, BLOCK_COUNT, BlockKind},
    panel::{Panel, registry::TempFileRegistry},
    render::formula::{FormulaRenderer, RenderFormula},
    session::form::FieldId,
};

fn files_in(dir: &Path) -> HashSet<PathBuf> {
    fs::read_dir(dir)
        .map(|entries| entries.map(|e| e.unwrap().path()).collect())
        .unwrap_or_default()
}

fn session_in(dir: &Path) -> Session {
    Session::new(SessionConfig {
        image_dir: dir.to_path_buf(),
        ..SessionConfig::default()
    })
}

#[test]
fn blank_constants_still_build_present_and_export() {
    let images = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let inputs = InputSet::new("0.71", "", "", "2.5", "");

    let blocks = derivation::build(&inputs);
    assert_eq!(blocks.len(), BLOCK_COUNT);

    let renderer = FormulaRenderer::new(images.path());
    let mut registry = TempFileRegistry::new();
    let mut panel = Panel::default();
    let report = panel.present(&blocks, &renderer, &mut registry);
    assert!(report.shown <= BLOCK_COUNT);
    assert_eq!(report.shown + report.skipped, BLOCK_COUNT);
    assert!(panel.export_available());

    let destination = out.path().join("report.pdf");
    let exported = Exporter::new(images.path())
        .export(&inputs, &blocks, &destination)
        .unwrap();
    assert!(fs::metadata(&destination).unwrap().len() > 0);
    assert_eq!(exported.path, destination);
}

#[test]
fn cancelled_picker_writes_nothing_and_changes_nothing() {
    let images = tempfile::tempdir().unwrap();
    let mut session = session_in(images.path());
    session.run();

    let before_files = files_in(images.path());
    let before_registry = session.registry().paths().to_vec();

    let outcome = session.export(&mut PresetPicker::cancelled(), Instant::now());
    assert!(matches!(outcome, ExportOutcome::Cancelled));
    assert!(session.notice().is_none());
    assert!(session.export_visible());
    assert_eq!(files_in(images.path()), before_files);
    assert_eq!(session.registry().paths(), before_registry.as_slice());
}

#[test]
fn single_letters_stay_italic_and_words_go_upright() {
    let plain = derivation::build(&InputSet::new("0.71", "Q", "β", "2.5", "k_o(β)"));
    let word = derivation::build(&InputSet::new("0.71", "Re", "β", "2.5", "k_o(β)"));

    let eq28 = |blocks: &[laplace_helper::ContentBlock]| {
        blocks
            .iter()
            .find_map(|b| b.as_formula())
            .map(|f| f.source.clone())
            .unwrap()
    };

    let plain = eq28(&plain);
    let word = eq28(&word);
    assert!(plain.contains("tilde(theta)(Q, s)"), "{plain}");
    assert!(plain.contains("exp(-Q sqrt("), "{plain}");
    assert!(word.contains(r#"tilde(theta)(upright("Re"), s)"#), "{word}");
    assert!(word.contains(r#"exp(-upright("Re") sqrt("#), "{word}");
}

#[test]
fn letter_digit_inputs_still_typeset_every_formula() {
    let images = tempfile::tempdir().unwrap();
    let renderer = FormulaRenderer::new(images.path());
    let inputs = InputSet::new("Pr2", "a1", "b0", "k1", "T0");

    let blocks = derivation::build(&inputs);
    let formulas: Vec<_> = blocks.iter().filter_map(|b| b.as_formula()).collect();
    assert_eq!(formulas.len(), 9);
    for formula in formulas {
        if let Err(err) = renderer.render(&formula.source, formula.size) {
            panic!("{} did not typeset: {err}", formula.source);
        }
    }

    let mut registry = TempFileRegistry::new();
    let report = Panel::default().present(&blocks, &renderer, &mut registry);
    assert_eq!(report.skipped, 0);
}

#[test]
fn structure_does_not_depend_on_inputs() {
    let a = derivation::build(&InputSet::new("0.71", "y", "β", "2.5", "k_o(β)"));
    let b = derivation::build(&InputSet::new("Pr", "7", "0.3", "", "Nu"));

    let kinds = |blocks: &[laplace_helper::ContentBlock]| -> Vec<BlockKind> {
        blocks.iter().map(|b| b.kind()).collect()
    };
    assert_eq!(kinds(&a), kinds(&b));

    for (x, y) in a.iter().zip(&b) {
        if let (Some(x), Some(y)) = (x.as_text(), y.as_text()) {
            assert_eq!(x, y);
        }
    }
}

#[test]
fn rerunning_deletes_the_previous_images() {
    let images = tempfile::tempdir().unwrap();
    let mut session = session_in(images.path());

    session.run();
    let first = session.registry().paths().to_vec();
    assert!(!first.is_empty());
    assert!(first.iter().all(|p| p.exists()));

    {
        let k0 = session.form_mut().field_mut(FieldId::K0);
        k0.toggle();
        k0.set_value("1");
    }
    session.run();
    let second = session.registry().paths().to_vec();

    assert!(first.iter().all(|p| !p.exists()));
    assert!(second.iter().all(|p| p.exists()));
    assert!(first.iter().all(|p| !second.contains(p)));
    assert_eq!(files_in(images.path()).len(), second.len());

    session.close();
    assert!(files_in(images.path()).is_empty());
}

#[test]
fn export_cleans_its_own_images_and_leaves_the_panel_alone() {
    let images = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let mut session = session_in(images.path());
    session.run();

    let on_screen = files_in(images.path());
    assert_eq!(on_screen.len(), session.registry().len());

    let mut picker = PresetPicker::new(Some(out.path().join("derivation")));
    let report = match session.export(&mut picker, Instant::now()) {
        ExportOutcome::Saved(report) => report,
        other => panic!("export failed: {other:?}"),
    };

    assert_eq!(report.path, out.path().join("derivation.pdf"));
    assert!(report.bytes > 0);
    assert_eq!(files_in(images.path()), on_screen);
    assert!(!session.export_visible());
}

#[test]
fn dropping_the_session_removes_its_images() {
    let images = tempfile::tempdir().unwrap();
    {
        let mut session = session_in(images.path());
        session.run();
        assert!(!files_in(images.path()).is_empty());
    }
    assert!(files_in(images.path()).is_empty());
}

#[test]
fn interrupt_cleanup_removes_a_live_sessions_images() {
    let images = tempfile::tempdir().unwrap();
    let foreign = images.path().join("formula_0_1_2.png");
    fs::write(&foreign, b"png").unwrap();

    let mut session = session_in(images.path());
    session.run();
    let on_screen = session.registry().len();
    assert!(on_screen > 0);

    assert_eq!(laplace_helper::interrupt::cleanup(images.path()), on_screen);
    assert_eq!(files_in(images.path()), HashSet::from([foreign]));

    session.close();
}
