#[cfg(test)]
mod tests {
    use rand::prelude::SmallRng;
    use rand::{Rng, SeedableRng};
    use test_case::test_case;

    use sheetpack::packers::{LayoutKind, Packer, SingleBinPack};
    use sheetpack::util::{SingleBinConfig, assertions};

    fn check_result(packer: &SingleBinPack, width: i32, height: i32, quantity: usize) {
        let (bin_width, bin_height) = packer.bin_size();
        let rects = packer.used_rectangles();
        assert!(rects.len() <= quantity);
        assert!(rects.iter().all(|r| r.matches_size(width, height)));
        assert!(assertions::rects_within_bin(rects, bin_width, bin_height));
        assert!(assertions::rects_are_disjoint(rects));
    }

    #[test]
    fn mixed_layout_beats_pure_orientations() {
        let _ = env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .try_init();

        let mut packer = SingleBinPack::new(1000, 1000).unwrap();
        let rects = packer.insert(310, 210, 50).unwrap();
        check_result(&packer, 310, 210, 50);

        //pure orientations fit 3x4 items
        assert!(rects.len() >= 12);
        let summary = packer.last_layout().unwrap();
        assert_eq!(summary.kind, LayoutKind::Mixed);
        assert_eq!(summary.placed, rects.len());
        assert_eq!(summary.requested, 50);
    }

    #[test]
    fn everything_fits_in_one_column() {
        let mut packer = SingleBinPack::new(100, 100).unwrap();
        let rects = packer.insert(30, 20, 5).unwrap();
        assert_eq!(rects.len(), 5);
        check_result(&packer, 30, 20, 5);
        //long side along X, stacked from the top
        assert!(rects.iter().all(|r| r.x == 0 && r.width == 30));
        assert_eq!(packer.last_layout().unwrap().max_x, 30.0);
    }

    #[test]
    fn requested_orientation_does_not_matter() {
        let mut packer = SingleBinPack::new(500, 300).unwrap();
        let upright = packer.insert(70, 40, 30).unwrap();
        let rotated = packer.insert(40, 70, 30).unwrap();
        assert_eq!(upright.len(), rotated.len());
        let max_x = |rects: &[sheetpack::geometry::Rect]| rects.iter().map(|r| r.right()).max();
        assert_eq!(max_x(&upright), max_x(&rotated));
        check_result(&packer, 40, 70, 30);
    }

    #[test]
    fn each_insert_replaces_the_previous_layout() {
        let mut packer = SingleBinPack::new(200, 200).unwrap();
        packer.insert(50, 50, 10).unwrap();
        assert_eq!(packer.used_rectangles().len(), 10);
        let rects = packer.insert(20, 10, 3).unwrap();
        assert_eq!(packer.used_rectangles(), rects.as_slice());
        assert_eq!(rects.len(), 3);
    }

    #[test]
    fn degenerate_requests() {
        let mut packer = SingleBinPack::new(100, 100).unwrap();
        assert!(packer.insert(10, 10, 0).unwrap().is_empty());
        assert!(packer.last_layout().is_none());
        assert!(packer.insert(101, 120, 3).unwrap().is_empty());
        assert!(packer.insert(0, 10, 3).is_err());
        assert!(SingleBinPack::new(100, 0).is_err());

        //more than the sheet can hold
        let rects = packer.insert(10, 10, 1_000).unwrap();
        assert_eq!(rects.len(), 100);
        check_result(&packer, 10, 10, 1_000);
    }

    #[test]
    fn item_too_tall_for_mixed_layout() {
        //310 + 210 > 500: only pure orientations, 10 columns of 2 horizontal items
        let mut packer = SingleBinPack::new(4000, 500).unwrap();
        let rects = packer.insert(310, 210, 20).unwrap();
        check_result(&packer, 310, 210, 20);
        assert_eq!(rects.len(), 20);
        assert_ne!(packer.last_layout().unwrap().kind, LayoutKind::Mixed);
    }

    #[test_case(None; "default threshold")]
    #[test_case(Some(0.0); "eager trades")]
    #[test_case(Some(1e9); "no trades")]
    fn trade_threshold_keeps_layouts_valid(trade_threshold: Option<f64>) {
        let config = SingleBinConfig { trade_threshold };
        let mut packer = SingleBinPack::with_config(1200, 800, config).unwrap();
        let mut rng = SmallRng::seed_from_u64(0);
        for _ in 0..100 {
            let width = rng.random_range(10..=400);
            let height = rng.random_range(10..=400);
            let quantity = rng.random_range(1..=60);
            let rects = packer.insert(width, height, quantity).unwrap();
            assert_eq!(packer.used_rectangles(), rects.as_slice());
            check_result(&packer, width, height, quantity);
        }
    }

    #[test]
    fn default_threshold_never_places_fewer_items() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..50 {
            let (width, height) = (rng.random_range(20..=300), rng.random_range(20..=300));
            let quantity = rng.random_range(1..=80);

            let mut default = SingleBinPack::new(1000, 700).unwrap();
            let mut no_trades = SingleBinPack::with_config(
                1000,
                700,
                SingleBinConfig {
                    trade_threshold: Some(1e9),
                },
            )
            .unwrap();
            let n_default = default.insert(width, height, quantity).unwrap().len();
            let n_without_trades = no_trades.insert(width, height, quantity).unwrap().len();
            //trades only happen once every item is placed
            assert_eq!(n_default, n_without_trades);
        }
    }
}
