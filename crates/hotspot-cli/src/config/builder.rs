use super::defaults::DefaultsConfig;
use super::file::{
    FileConfig, FileDesignConfig, FileMinimizerConfig, FileMonteCarloConfig, FilePackerConfig,
};
use super::models::AppConfig;
use crate::cli::DesignArgs;
use crate::error::{CliError, Result};
use hotspot::engine::config as core_config;
use hotspot::engine::error::EngineError;
use std::path::PathBuf;
use std::str::FromStr;

pub fn build_config(args: &DesignArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };
    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let inputs = file_config.inputs.take().unwrap_or_default();
    let structure = args
        .structure
        .clone()
        .or(inputs.structure)
        .unwrap_or(defaults.structure);
    let relaxed = args
        .relaxed
        .clone()
        .or(inputs.relaxed)
        .unwrap_or(defaults.relaxed);

    let output = file_config.output.take().unwrap_or_default();
    let output_root = args
        .output_root
        .clone()
        .or(output.root)
        .unwrap_or(defaults.output_root);
    let jobs = core_config::JobConfig {
        prefix: args
            .prefix
            .clone()
            .or(output.prefix)
            .unwrap_or(defaults.prefix),
        num_decoys: args
            .num_decoys
            .or(output.num_decoys)
            .unwrap_or(defaults.num_decoys),
    };

    let design_file = file_config.design.take().unwrap_or_default();
    let max_attempts_per_decoy = design_file
        .max_attempts_per_decoy
        .unwrap_or(defaults.max_attempts_per_decoy);
    let shells = merge_shells(design_file);

    let mut packer = merge_packer(file_config.packer.take().unwrap_or_default());
    match (
        args.include_current.with_current,
        args.include_current.no_current,
    ) {
        (true, false) => packer.include_current = true,
        (false, true) => packer.include_current = false,
        _ => {}
    }

    let core_config = core_config::DesignConfigBuilder::new()
        .target(args.target)
        .shells(shells)
        .packer(packer)
        .minimizer(merge_minimizer(
            file_config.minimizer.take().unwrap_or_default(),
        ))
        .monte_carlo(merge_monte_carlo(
            file_config.monte_carlo.take().unwrap_or_default(),
        ))
        .jobs(jobs)
        .max_attempts_per_decoy(max_attempts_per_decoy)
        .output_dir(output_root.join(format!("mutating_res{}", args.target)))
        .seed(args.seed.or(file_config.seed))
        .build()
        .map_err(EngineError::from)?;

    Ok(AppConfig {
        structure,
        relaxed,
        core_config,
    })
}

fn merge_shells(file_val: FileDesignConfig) -> core_config::ShellConfig {
    let defaults = core_config::ShellConfig::default();
    core_config::ShellConfig {
        radius_min: file_val.radius_min.unwrap_or(defaults.radius_min),
        radius_max: file_val.radius_max.unwrap_or(defaults.radius_max),
        repack_margin: file_val.repack_margin.unwrap_or(defaults.repack_margin),
        include_target: file_val.include_target.unwrap_or(defaults.include_target),
        protected_residues: file_val
            .protected_residues
            .unwrap_or(defaults.protected_residues),
    }
}

fn merge_packer(file_val: FilePackerConfig) -> core_config::PackerConfig {
    let defaults = core_config::PackerConfig::default();
    core_config::PackerConfig {
        temperature: file_val.temperature.unwrap_or(defaults.temperature),
        include_current: file_val.include_current.unwrap_or(defaults.include_current),
        no_repack_disulfides: file_val
            .no_repack_disulfides
            .unwrap_or(defaults.no_repack_disulfides),
    }
}

fn merge_minimizer(file_val: FileMinimizerConfig) -> core_config::MinimizerConfig {
    let defaults = core_config::MinimizerConfig::default();
    core_config::MinimizerConfig {
        movemap: core_config::MoveMap {
            backbone: file_val.backbone.unwrap_or(defaults.movemap.backbone),
            side_chains: file_val.side_chains.unwrap_or(defaults.movemap.side_chains),
            jump: file_val.jump.unwrap_or(defaults.movemap.jump),
        },
        tolerance: file_val.tolerance.unwrap_or(defaults.tolerance),
        max_iterations: file_val.max_iterations.unwrap_or(defaults.max_iterations),
        coordinate_stdev: file_val
            .coordinate_stdev
            .unwrap_or(defaults.coordinate_stdev),
    }
}

fn merge_monte_carlo(file_val: FileMonteCarloConfig) -> core_config::MonteCarloConfig {
    let defaults = core_config::MonteCarloConfig::default();
    core_config::MonteCarloConfig {
        max_trials: file_val.max_trials.unwrap_or(defaults.max_trials),
        max_accepted_trials: file_val
            .max_accepted_trials
            .unwrap_or(defaults.max_accepted_trials),
        temperature: file_val.temperature.unwrap_or(defaults.temperature),
        recover_low: file_val.recover_low.unwrap_or(defaults.recover_low),
        preapply: file_val.preapply.unwrap_or(defaults.preapply),
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {kind} value for {key}: {value}")))
}

fn parse_index_list(key: &str, value: &str) -> Result<Vec<usize>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| parse_value(key, item, "integer"))
        .collect()
}

/// Patches the file layer with `KEY=VALUE` pairs, keys named as in the file.
fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{kv_pair}'. Expected KEY=VALUE."
            )));
        };
        let key = key.trim();

        match key {
            "seed" => config.seed = Some(parse_value(key, value, "integer")?),
            "inputs.structure" => {
                config.inputs.get_or_insert_with(Default::default).structure =
                    Some(PathBuf::from(value.trim()));
            }
            "inputs.relaxed" => {
                config.inputs.get_or_insert_with(Default::default).relaxed =
                    Some(PathBuf::from(value.trim()));
            }
            "output.root" => {
                config.output.get_or_insert_with(Default::default).root =
                    Some(PathBuf::from(value.trim()));
            }
            "output.prefix" => {
                config.output.get_or_insert_with(Default::default).prefix =
                    Some(value.trim().to_string());
            }
            "output.num-decoys" => {
                config.output.get_or_insert_with(Default::default).num_decoys =
                    Some(parse_value(key, value, "integer")?);
            }
            "design.radius-min" => {
                config.design.get_or_insert_with(Default::default).radius_min =
                    Some(parse_value(key, value, "integer")?);
            }
            "design.radius-max" => {
                config.design.get_or_insert_with(Default::default).radius_max =
                    Some(parse_value(key, value, "integer")?);
            }
            "design.repack-margin" => {
                config.design.get_or_insert_with(Default::default).repack_margin =
                    Some(parse_value(key, value, "float")?);
            }
            "design.include-target" => {
                config.design.get_or_insert_with(Default::default).include_target =
                    Some(parse_value(key, value, "boolean")?);
            }
            "design.protected-residues" => {
                config
                    .design
                    .get_or_insert_with(Default::default)
                    .protected_residues = Some(parse_index_list(key, value)?);
            }
            "design.max-attempts-per-decoy" => {
                config
                    .design
                    .get_or_insert_with(Default::default)
                    .max_attempts_per_decoy = Some(parse_value(key, value, "integer")?);
            }
            "packer.temperature" => {
                config.packer.get_or_insert_with(Default::default).temperature =
                    Some(parse_value(key, value, "float")?);
            }
            "packer.include-current" => {
                config.packer.get_or_insert_with(Default::default).include_current =
                    Some(parse_value(key, value, "boolean")?);
            }
            "packer.no-repack-disulfides" => {
                config
                    .packer
                    .get_or_insert_with(Default::default)
                    .no_repack_disulfides = Some(parse_value(key, value, "boolean")?);
            }
            "minimizer.tolerance" => {
                config.minimizer.get_or_insert_with(Default::default).tolerance =
                    Some(parse_value(key, value, "float")?);
            }
            "minimizer.max-iterations" => {
                config
                    .minimizer
                    .get_or_insert_with(Default::default)
                    .max_iterations = Some(parse_value(key, value, "integer")?);
            }
            "minimizer.coordinate-stdev" => {
                config
                    .minimizer
                    .get_or_insert_with(Default::default)
                    .coordinate_stdev = Some(parse_value(key, value, "float")?);
            }
            "minimizer.backbone" => {
                config.minimizer.get_or_insert_with(Default::default).backbone =
                    Some(parse_value(key, value, "boolean")?);
            }
            "minimizer.side-chains" => {
                config.minimizer.get_or_insert_with(Default::default).side_chains =
                    Some(parse_value(key, value, "boolean")?);
            }
            "minimizer.jump" => {
                config.minimizer.get_or_insert_with(Default::default).jump =
                    Some(parse_value(key, value, "boolean")?);
            }
            "monte-carlo.max-trials" => {
                config
                    .monte_carlo
                    .get_or_insert_with(Default::default)
                    .max_trials = Some(parse_value(key, value, "integer")?);
            }
            "monte-carlo.max-accepted-trials" => {
                config
                    .monte_carlo
                    .get_or_insert_with(Default::default)
                    .max_accepted_trials = Some(parse_value(key, value, "integer")?);
            }
            "monte-carlo.temperature" => {
                config
                    .monte_carlo
                    .get_or_insert_with(Default::default)
                    .temperature = Some(parse_value(key, value, "float")?);
            }
            "monte-carlo.recover-low" => {
                config
                    .monte_carlo
                    .get_or_insert_with(Default::default)
                    .recover_low = Some(parse_value(key, value, "boolean")?);
            }
            "monte-carlo.preapply" => {
                config
                    .monte_carlo
                    .get_or_insert_with(Default::default)
                    .preapply = Some(parse_value(key, value, "boolean")?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{key}'"
                )));
            }
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::IncludeCurrent;
    use std::fs;
    use tempfile::tempdir;

    fn base_design_args() -> DesignArgs {
        DesignArgs {
            target: 52,
            structure: None,
            relaxed: None,
            config: None,
            output_root: None,
            num_decoys: None,
            prefix: None,
            seed: None,
            include_current: IncludeCurrent::default(),
            set_values: vec![],
        }
    }

    #[test]
    fn defaults_fill_everything_not_given() {
        let app = build_config(&base_design_args()).expect("build ok");
        let cfg = app.core_config;

        assert_eq!(app.structure, PathBuf::from("1BTL.clean.pdb"));
        assert_eq!(app.relaxed, PathBuf::from("relaxed_1BTL.pdb"));
        assert_eq!(cfg.output_dir, PathBuf::from("Outputs/mutating_res52"));
        assert_eq!(cfg.jobs, core_config::JobConfig::default());
        assert_eq!(cfg.shells, core_config::ShellConfig::default());
        assert_eq!(cfg.packer, core_config::PackerConfig::default());
        assert_eq!(cfg.minimizer, core_config::MinimizerConfig::default());
        assert_eq!(cfg.monte_carlo, core_config::MonteCarloConfig::default());
        assert_eq!(cfg.max_attempts_per_decoy, 100);
        assert_eq!(cfg.seed, None);
    }

    #[test]
    fn file_values_are_merged() {
        let dir = tempdir().unwrap();
        let cfg_path = dir.path().join("hotspot.toml");
        let toml = r#"
            seed = 3

            [inputs]
            relaxed = "relaxed.pdb"

            [output]
            root = "runs"
            prefix = "tem1"
            num-decoys = 8

            [design]
            radius-min = 6
            radius-max = 9
            include-target = false
            protected-residues = []

            [minimizer]
            backbone = false

            [monte-carlo]
            temperature = 1.2
            "#;
        fs::write(&cfg_path, toml).unwrap();

        let mut args = base_design_args();
        args.config = Some(cfg_path);
        let app = build_config(&args).expect("build ok");
        let cfg = app.core_config;

        assert_eq!(app.relaxed, PathBuf::from("relaxed.pdb"));
        assert_eq!(cfg.output_dir, PathBuf::from("runs/mutating_res52"));
        assert_eq!(cfg.jobs.prefix, "tem1");
        assert_eq!(cfg.jobs.num_decoys, 8);
        assert_eq!(cfg.shells.radius_min, 6);
        assert_eq!(cfg.shells.radius_max, 9);
        assert!(!cfg.shells.include_target);
        assert!(cfg.shells.protected_residues.is_empty());
        assert!(!cfg.minimizer.movemap.backbone);
        assert!(cfg.minimizer.movemap.side_chains);
        assert_eq!(cfg.monte_carlo.temperature, 1.2);
        assert_eq!(cfg.seed, Some(3));
    }

    #[test]
    fn cli_overrides_file_values() {
        let dir = tempdir().unwrap();
        let cfg_path = dir.path().join("hotspot.toml");
        fs::write(
            &cfg_path,
            "seed = 3\n[output]\nnum-decoys = 8\nprefix = \"a\"\n[packer]\ninclude-current = true\n",
        )
        .unwrap();

        let mut args = base_design_args();
        args.config = Some(cfg_path);
        args.num_decoys = Some(2);
        args.prefix = Some("b".to_string());
        args.seed = Some(10);
        args.include_current = IncludeCurrent {
            with_current: false,
            no_current: true,
        };

        let cfg = build_config(&args).expect("build ok").core_config;
        assert_eq!(cfg.jobs.num_decoys, 2);
        assert_eq!(cfg.jobs.prefix, "b");
        assert_eq!(cfg.seed, Some(10));
        assert!(!cfg.packer.include_current);
    }

    #[test]
    fn set_values_override() {
        let mut args = base_design_args();
        args.set_values = vec![
            "design.radius-max=10".to_string(),
            "design.protected-residues=2, 19,20".to_string(),
            "packer.temperature=0.8".to_string(),
            "minimizer.max-iterations=50".to_string(),
            "monte-carlo.recover-low=false".to_string(),
            "output.num-decoys=6".to_string(),
        ];

        let cfg = build_config(&args).expect("build ok").core_config;
        assert_eq!(cfg.shells.radius_max, 10);
        assert_eq!(cfg.shells.protected_residues, vec![2, 19, 20]);
        assert!((cfg.packer.temperature - 0.8).abs() < 1e-12);
        assert_eq!(cfg.minimizer.max_iterations, 50);
        assert!(!cfg.monte_carlo.recover_low);
        assert_eq!(cfg.jobs.num_decoys, 6);
    }

    #[test]
    fn malformed_set_values_are_rejected() {
        for bad in ["design.radius-max", "design.radius-max=ten", "design.radius=5"] {
            let mut args = base_design_args();
            args.set_values = vec![bad.to_string()];
            assert!(
                matches!(build_config(&args), Err(CliError::Config(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn invalid_merged_config_is_reported() {
        let mut args = base_design_args();
        args.set_values = vec!["design.radius-min=13".to_string()];
        assert!(matches!(
            build_config(&args),
            Err(CliError::Engine(EngineError::Config(
                core_config::ConfigError::InvalidParameter { .. }
            )))
        ));

        let mut args = base_design_args();
        args.target = 0;
        assert!(matches!(
            build_config(&args),
            Err(CliError::Engine(EngineError::Config(_)))
        ));
    }
}
