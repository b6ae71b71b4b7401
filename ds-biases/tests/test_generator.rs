use std::error::Error;
use std::io;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use ds_biases::{
    BoostedRelease, BoostedReleases, GenerationError, GeneratorConfig, RuleGenerator, RuleType,
};
use ds_protocol::{
    OrganizationId, Project, ProjectId, RuleId, SamplingRule, TraceContext, match_rules,
};
use ds_quotas::StaticQuotas;
use serde_json::json;
use similar_asserts::assert_eq;
use uuid::Uuid;

struct Unavailable;

impl BoostedReleases for Unavailable {
    fn boosted_releases(
        &self,
        _project: &Project,
    ) -> Result<Vec<BoostedRelease>, Box<dyn Error + Send + Sync>> {
        Err(Box::new(io::Error::other("redis is down")))
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn project() -> Project {
    Project::new(ProjectId::new(42), OrganizationId::new(1))
}

fn generator(sample_rate: f64) -> RuleGenerator {
    RuleGenerator::new(
        Arc::new(StaticQuotas::with_sample_rate(sample_rate)),
        Arc::new(Vec::<BoostedRelease>::new()),
    )
}

fn ids(rules: &[SamplingRule]) -> Vec<RuleId> {
    rules.iter().map(|rule| rule.id).collect()
}

fn trace(environment: &str) -> TraceContext {
    TraceContext {
        trace_id: Uuid::new_v4(),
        release: Some("backend@1.0".to_owned()),
        environment: Some(environment.to_owned()),
        ..Default::default()
    }
}

#[test]
fn test_uniform_rule_is_last() {
    ds_log::init_test!();

    for sample_rate in [0.0, 0.1, 0.5, 0.99, 1.0] {
        let rules = generator(sample_rate).generate_rules(&project(), now());
        let last = rules.last().unwrap();

        assert_eq!(last.id, RuleType::BoostLowVolumeProjects.reserved_id());
        assert_eq!(last.sampling_value.value(), sample_rate);
    }
}

#[test]
fn test_full_sample_rate_emits_only_uniform_rule() {
    let rules = generator(1.0).generate_rules(&project(), now());
    assert_eq!(ids(&rules), vec![RuleId(1000)]);
}

#[test]
fn test_default_biases() {
    let rules = generator(0.1).generate_rules(&project(), now());

    insta::assert_json_snapshot!(rules, @r#"
    [
      {
        "condition": {
          "op": "not",
          "inner": {
            "op": "eq",
            "name": "trace.replay_id",
            "value": null,
            "options": {
              "ignoreCase": true
            }
          }
        },
        "samplingValue": {
          "type": "sampleRate",
          "value": 1.0
        },
        "type": "trace",
        "id": 1005
      },
      {
        "condition": {
          "op": "or",
          "inner": [
            {
              "op": "glob",
              "name": "trace.environment",
              "value": [
                "*debug*",
                "*dev*",
                "*local*",
                "*qa*",
                "*test*"
              ]
            }
          ]
        },
        "samplingValue": {
          "type": "sampleRate",
          "value": 1.0
        },
        "type": "trace",
        "id": 1001
      },
      {
        "condition": {
          "op": "and",
          "inner": []
        },
        "samplingValue": {
          "type": "sampleRate",
          "value": 0.1
        },
        "type": "trace",
        "id": 1000
      }
    ]
    "#);
}

#[test]
fn test_boosted_releases() {
    let releases = vec![
        BoostedRelease {
            version: "backend@1.0".to_owned(),
            environment: Some("prod".to_owned()),
            timestamp: now() - TimeDelta::minutes(10),
        },
        BoostedRelease {
            version: "backend@0.9".to_owned(),
            environment: None,
            timestamp: now() - TimeDelta::minutes(20),
        },
    ];

    let generator = RuleGenerator::new(
        Arc::new(StaticQuotas::with_sample_rate(0.1)),
        Arc::new(releases),
    );

    let rules = generator.generate_rules(&project(), now());
    assert_eq!(
        ids(&rules),
        vec![
            RuleId(1005),
            RuleId(1001),
            RuleId(1500),
            RuleId(1501),
            RuleId(1000)
        ]
    );
}

#[test]
fn test_max_boosted_releases_from_config() {
    let releases: Vec<_> = (0..4)
        .map(|i| BoostedRelease {
            version: format!("backend@1.{i}"),
            environment: Some("prod".to_owned()),
            timestamp: now(),
        })
        .collect();

    let generator = RuleGenerator::new(
        Arc::new(StaticQuotas::with_sample_rate(0.1)),
        Arc::new(releases),
    )
    .with_config(GeneratorConfig {
        latest_release_boost: TimeDelta::minutes(30),
        max_boosted_releases: 2,
    });

    let rules = generator.generate_rules(&project(), now());
    assert_eq!(
        ids(&rules),
        vec![
            RuleId(1005),
            RuleId(1001),
            RuleId(1500),
            RuleId(1501),
            RuleId(1000)
        ]
    );
}

#[test]
fn test_user_disabled_biases() {
    let project = project().with_option(
        "sentry:dynamic_sampling_biases",
        json!([
            {"id": "boostEnvironments", "active": false},
            {"id": "boostReplayId", "active": false},
            {"id": "boostLowVolumeProjects", "active": false}
        ]),
    );

    let rules = generator(0.1).generate_rules(&project, now());
    assert_eq!(ids(&rules), vec![RuleId(1000)]);
}

#[test]
fn test_missing_blended_sample_rate() {
    ds_log::init_test!();

    let generator = RuleGenerator::new(
        Arc::new(StaticQuotas::default()),
        Arc::new(Vec::<BoostedRelease>::new()),
    );

    let error = generator
        .try_generate_rules(&project(), now())
        .unwrap_err();
    assert!(matches!(error, GenerationError::MissingBlendedSampleRate));

    assert!(generator.generate_rules(&project(), now()).is_empty());
}

#[test]
fn test_invalid_blended_sample_rate() {
    for sample_rate in [-0.1, 1.5, f64::NAN, f64::INFINITY] {
        let error = generator(sample_rate)
            .try_generate_rules(&project(), now())
            .unwrap_err();
        assert!(matches!(error, GenerationError::InvalidBlendedSampleRate(_)));
        assert!(
            generator(sample_rate)
                .generate_rules(&project(), now())
                .is_empty()
        );
    }
}

#[test]
fn test_malformed_bias_option_fails_open() {
    let project = project().with_option("sentry:dynamic_sampling_biases", json!("garbage"));

    let error = generator(0.1)
        .try_generate_rules(&project, now())
        .unwrap_err();
    assert!(matches!(error, GenerationError::InvalidBiasOption(_)));

    assert!(generator(0.1).generate_rules(&project, now()).is_empty());
}

#[test]
fn test_failing_bias_is_skipped() {
    ds_log::init_test!();

    let generator = RuleGenerator::new(
        Arc::new(StaticQuotas::with_sample_rate(0.1)),
        Arc::new(Unavailable),
    );

    let rules = generator.generate_rules(&project(), now());
    assert_eq!(ids(&rules), vec![RuleId(1005), RuleId(1001), RuleId(1000)]);
}

#[test]
fn test_rules_survive_json_roundtrip() {
    let releases = vec![BoostedRelease {
        version: "backend@1.0".to_owned(),
        environment: Some("prod".to_owned()),
        timestamp: now(),
    }];
    let generator = RuleGenerator::new(
        Arc::new(StaticQuotas::with_sample_rate(0.3)),
        Arc::new(releases),
    );

    let rules = generator.generate_rules(&project(), now());
    let json = serde_json::to_string(&rules).unwrap();
    let decoded: Vec<SamplingRule> = serde_json::from_str(&json).unwrap();

    assert_eq!(decoded, rules);
    assert_eq!(serde_json::to_string(&decoded).unwrap(), json);
}

#[test]
fn test_rules_select_expected_traces() {
    let rules = generator(0.1).generate_rules(&project(), now());

    let result = match_rules(now(), &trace("local-dev"), &rules).unwrap();
    assert_eq!(result.sample_rate, 1.0);
    assert_eq!(result.matched_rules, vec![RuleId(1001)]);

    let result = match_rules(now(), &trace("production"), &rules).unwrap();
    assert_eq!(result.sample_rate, 0.1);
    assert_eq!(result.matched_rules, vec![RuleId(1000)]);

    let mut replay = trace("production");
    replay.replay_id = Some(Uuid::new_v4());
    let result = match_rules(now(), &replay, &rules).unwrap();
    assert_eq!(result.matched_rules, vec![RuleId(1005)]);
}
