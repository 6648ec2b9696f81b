#[cfg(test)]
mod tests {
    use std::env;

    use sheetpack::packers::{
        FreeRectChoice, LayoutKind, MaxRectsHeuristic, ShelfHeuristic, SkylineHeuristic,
        SplitRule,
    };
    use sheetpack::util::SingleBinConfig;
    use sheetpack_cli::config::{Algorithm, ItemSource, RunConfig};
    use sheetpack_cli::io;
    use sheetpack_cli::io::output::RunOutput;
    use sheetpack_cli::io::svg_export::{SvgDrawOptions, SvgTheme, layout_to_svg};
    use sheetpack_cli::runner;
    use sheetpack_cli::verify::verify_placements;
    use test_case::test_case;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn random_config(algorithm: Algorithm, batch: bool) -> RunConfig {
        RunConfig {
            bin_width: 512,
            bin_height: 512,
            algorithm,
            items: ItemSource::Random {
                n_items: 200,
                min_side: 8,
                max_side: 64,
            },
            batch,
            prng_seed: Some(0),
            ..RunConfig::default()
        }
    }

    #[test_case(Algorithm::MaxRects { heuristic: MaxRectsHeuristic::BestShortSideFit, allow_rotation: true }, false; "maxrects_bssf")]
    #[test_case(Algorithm::MaxRects { heuristic: MaxRectsHeuristic::ContactPoint, allow_rotation: false }, true; "maxrects_cp_batch")]
    #[test_case(Algorithm::Guillotine { choice: FreeRectChoice::BestAreaFit, split: SplitRule::MinimizeArea, merge: true }, false; "guillotine_baf")]
    #[test_case(Algorithm::Guillotine { choice: FreeRectChoice::WorstShortSideFit, split: SplitRule::LongerAxis, merge: false }, true; "guillotine_wssf_batch")]
    #[test_case(Algorithm::Skyline { heuristic: SkylineHeuristic::BottomLeft, use_waste_map: true }, false; "skyline_bl_waste")]
    #[test_case(Algorithm::Skyline { heuristic: SkylineHeuristic::MinWasteFit, use_waste_map: false }, true; "skyline_mwf_batch")]
    #[test_case(Algorithm::Shelf { heuristic: ShelfHeuristic::FirstFit, use_waste_map: true }, false; "shelf_ff_waste")]
    #[test_case(Algorithm::Shelf { heuristic: ShelfHeuristic::NextFit, use_waste_map: false }, true; "shelf_nf_batch_ignored")]
    fn run_random_items(algorithm: Algorithm, batch: bool) {
        init_logger();
        let config = random_config(algorithm, batch);
        let report = runner::run(&config).unwrap();

        assert_eq!(report.n_requested, 200);
        assert!(!report.placed.is_empty());
        assert!(report.placed.len() <= report.n_requested);
        assert!(report.occupancy > 0.0 && report.occupancy <= 1.0);
        assert!(report.layout.is_none());

        let mut items = report.placed.iter().map(|pi| pi.item).collect::<Vec<_>>();
        items.sort_unstable();
        items.dedup();
        assert_eq!(items.len(), report.placed.len(), "an item was placed twice");
    }

    #[test]
    fn run_is_deterministic_for_a_seed() {
        init_logger();
        let config = random_config(RunConfig::default().algorithm, false);
        let first = runner::run(&config).unwrap();
        let second = runner::run(&config).unwrap();
        assert_eq!(first.placed, second.placed);
        assert_eq!(first.free_rects, second.free_rects);
    }

    #[test]
    fn run_uniform_items() {
        init_logger();
        let config = RunConfig {
            bin_width: 1000,
            bin_height: 1000,
            algorithm: Algorithm::SingleBin {
                config: SingleBinConfig::default(),
            },
            items: ItemSource::Uniform {
                width: 70,
                height: 40,
                quantity: 50,
            },
            ..RunConfig::default()
        };
        let report = runner::run(&config).unwrap();
        assert_eq!(report.placed.len(), 50);
        assert!(report.free_rects.is_empty());

        let layout = report.layout.unwrap();
        assert_eq!(layout.placed, 50);
        assert_eq!(layout.requested, 50);
        assert!(matches!(
            layout.kind,
            LayoutKind::AllHorizontal | LayoutKind::AllVertical | LayoutKind::Mixed
        ));
    }

    #[test]
    fn uniform_engine_rejects_mixed_items() {
        init_logger();
        let config = RunConfig {
            algorithm: Algorithm::SingleBin {
                config: SingleBinConfig::default(),
            },
            ..RunConfig::default()
        };
        assert!(runner::run(&config).is_err());
    }

    #[test]
    fn invalid_items_are_rejected() {
        init_logger();
        let mut config = random_config(RunConfig::default().algorithm, false);
        config.items = ItemSource::List {
            sizes: vec![(10, 10), (0, 10)],
        };
        assert!(runner::run(&config).is_err());

        config.items = ItemSource::Random {
            n_items: 10,
            min_side: 20,
            max_side: 10,
        };
        assert!(runner::run(&config).is_err());
    }

    #[test]
    fn oversized_items_are_left_out() {
        init_logger();
        let mut config = random_config(RunConfig::default().algorithm, false);
        config.bin_width = 100;
        config.bin_height = 100;
        config.items = ItemSource::List {
            sizes: vec![(60, 60), (200, 10), (40, 100)],
        };
        let report = runner::run(&config).unwrap();
        let items = report.placed.iter().map(|pi| pi.item).collect::<Vec<_>>();
        assert_eq!(items, vec![0, 2]);
        verify_placements(&report.placed, &[(60, 60), (200, 10), (40, 100)], 100, 100).unwrap();
    }

    #[test]
    fn config_is_read_from_json() {
        let json = r#"{
            "bin_width": 300,
            "bin_height": 200,
            "algorithm": { "kind": "Guillotine", "choice": "BestShortSideFit", "split": "ShorterLeftoverAxis", "merge": true },
            "items": { "kind": "List", "sizes": [[100, 50], [30, 30]] },
            "prng_seed": null,
            "svg_draw_options": { "theme": "Gray", "draw_free_rects": true }
        }"#;
        let config: RunConfig = serde_json::from_str(json).unwrap();
        assert_eq!(
            config.algorithm,
            Algorithm::Guillotine {
                choice: FreeRectChoice::BestShortSideFit,
                split: SplitRule::ShorterLeftoverAxis,
                merge: true,
            }
        );
        assert!(!config.batch);
        assert_eq!(config.svg_draw_options.theme, SvgTheme::Gray);
        assert!(config.svg_draw_options.draw_free_rects);
        assert!(!config.svg_draw_options.label_items);

        let single: RunConfig = serde_json::from_str(
            r#"{
                "bin_width": 300,
                "bin_height": 200,
                "algorithm": { "kind": "SingleBin" },
                "items": { "kind": "Uniform", "width": 30, "height": 20, "quantity": 10 },
                "prng_seed": 3
            }"#,
        )
        .unwrap();
        assert_eq!(
            single.algorithm,
            Algorithm::SingleBin {
                config: SingleBinConfig::default()
            }
        );
    }

    #[test]
    fn outputs_are_written() {
        init_logger();
        let mut config = random_config(RunConfig::default().algorithm, false);
        config.svg_draw_options = SvgDrawOptions {
            theme: SvgTheme::EarthTones,
            draw_free_rects: true,
            label_items: true,
        };
        let report = runner::run(&config).unwrap();

        let folder = env::temp_dir().join("sheetpack_cli_tests");
        std::fs::create_dir_all(&folder).unwrap();

        let svg = layout_to_svg(&report, config.svg_draw_options, "test");
        let svg_path = folder.join("layout.svg");
        io::write_svg(&svg, &svg_path).unwrap();
        let svg_text = std::fs::read_to_string(&svg_path).unwrap();
        assert!(svg_text.contains("free_rects"));
        assert!(svg_text.contains("items"));

        let json_path = folder.join("report.json");
        let output = RunOutput {
            config: config.clone(),
            report,
        };
        io::write_json(&output, &json_path).unwrap();
        let read_back: RunOutput =
            serde_json::from_reader(std::fs::File::open(&json_path).unwrap()).unwrap();
        assert_eq!(read_back.config, config);
        assert_eq!(read_back.report.placed, output.report.placed);
    }
}
