use clap::Parser;
use httpmock::prelude::*;
use pnae_lp::config::toml_config::TomlConfig;
use pnae_lp::core::ConfigProvider;
use pnae_lp::utils::validation::Validate;
use pnae_lp::{AllocationPipeline, CliConfig, EtlEngine, LocalStorage, LpError};
use std::path::Path;
use tempfile::TempDir;

fn write_json(dir: &Path, name: &str, value: serde_json::Value) -> String {
    let path = dir.join(name);
    std::fs::write(&path, value.to_string()).unwrap();
    path.to_str().unwrap().to_string()
}

fn resources_doc() -> serde_json::Value {
    serde_json::json!({
        "value": [
            {"Municipio": "A", "Vl_total_escolas": "600,5"},
            {"Municipio": "B", "Vl_total_escolas": "2000"},
            {"Municipio": "A", "Vl_total_escolas": "399,5"},
            {"Municipio": "C", "Vl_total_escolas": "abc"}
        ]
    })
}

fn students_doc() -> serde_json::Value {
    serde_json::json!({
        "value": [
            {"Municipio": "A", "Qt_alunos_pnae": 4},
            {"Municipio": "A", "Qt_alunos_pnae": 6},
            {"Municipio": "D", "Qt_alunos_pnae": 7}
        ]
    })
}

/// 以 `sh` 模擬求解器：把模型複製成結果檔並印出一行訊息
fn toml_config(resources: &str, students: &str, output: &str, extra: &str) -> TomlConfig {
    let content = format!(
        r#"
[run]
name = "integration"

[sources.resources]
path = '{resources}'

[sources.students]
path = '{students}'

[solver]
command = "sh"
args = ["-c", "cp \"$0\" \"$1\" && echo solver-ok", "{{model}}", "{{output}}"]
timeout_seconds = 10

[output]
path = '{output}'

{extra}
"#
    );
    TomlConfig::from_toml_str(&content).unwrap()
}

#[tokio::test]
async fn test_end_to_end_simple_run_with_solver() {
    let temp_dir = TempDir::new().unwrap();
    let resources = write_json(temp_dir.path(), "RecursosRepassados.json", resources_doc());
    let students = write_json(temp_dir.path(), "AlunosAtendidosPNAE.json", students_doc());
    let output_path = temp_dir.path().join("out");
    let output = output_path.to_str().unwrap().to_string();

    let config = toml_config(&resources, &students, &output, "");
    assert!(config.validate().is_ok());

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = AllocationPipeline::with_external_solver(storage, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, false);

    let outcome = engine.run().await.unwrap();

    // C 的金額無法解析，只剩 A、B 兩個變數
    assert_eq!(outcome.variable_count, 2);
    assert_eq!(outcome.model_path, output_path.join("modelo.lp"));

    let model = std::fs::read_to_string(output_path.join("modelo.lp")).unwrap();
    assert_eq!(model, outcome.lp_text);
    assert!(model.starts_with("Minimize\n obj: 100 x0\n"));
    assert!(model.contains(" total_resources: x0 + x1 <= 3000\n"));
    assert!(model.contains("Generals\n x0\n x1\nEnd\n"));

    let summary = std::fs::read_to_string(output_path.join("aggregados.csv")).unwrap();
    let rows: Vec<&str> = summary.lines().collect();
    assert_eq!(
        rows[0],
        "variable,entity,resource_total,student_count,average_spend_per_student"
    );
    assert_eq!(rows[1], "x0,A,1000.0,10,100.0");
    assert_eq!(rows[2], "x1,B,2000.0,0,2000.0");
    assert_eq!(rows.len(), 3);

    let solver = outcome.solver.unwrap();
    assert_eq!(solver.stdout.trim(), "solver-ok");
    assert_eq!(solver.result_text, model);
    assert!(output_path.join("output.txt").exists());
}

#[tokio::test]
async fn test_extended_run_without_solver() {
    let temp_dir = TempDir::new().unwrap();
    let resources = write_json(
        temp_dir.path(),
        "resources.json",
        serde_json::json!({"value": [{"Municipio": "D", "Vl_total_escolas": "15000"}]}),
    );
    let students = write_json(
        temp_dir.path(),
        "students.json",
        serde_json::json!({"value": [{"Municipio": "D", "Qt_alunos_pnae": 300}]}),
    );
    let output = temp_dir.path().to_str().unwrap().to_string();

    let extra = r#"
[model]
variant = "extended"
"#;
    let mut config = toml_config(&resources, &students, &output, extra);
    if let Some(solver) = config.solver.as_mut() {
        solver.enabled = Some(false);
    }

    let storage = LocalStorage::new(output.clone());
    let pipeline = AllocationPipeline::with_external_solver(storage, config);
    let outcome = EtlEngine::new(pipeline).run().await.unwrap();

    assert!(outcome.solver.is_none());
    assert!(!temp_dir.path().join("output.txt").exists());

    let model = std::fs::read_to_string(temp_dir.path().join("modelo.lp")).unwrap();
    assert!(model.contains(" obj: x0\n"));
    assert!(model.contains(" min_muni0: x0 >= 9000\n"));
    assert!(model.contains(" avg_student_spent_muni0: x0 >= 15000\n"));
    assert!(model.contains(" total_resources: x0 <= 15000\n"));
}

#[tokio::test]
async fn test_cli_config_with_http_datasets() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let resources_mock = server.mock(|when, then| {
        when.method(GET).path("/RecursosRepassados");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(resources_doc());
    });
    let students_mock = server.mock(|when, then| {
        when.method(GET).path("/AlunosAtendidosPNAE");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(students_doc());
    });

    let resources_url = server.url("/RecursosRepassados");
    let students_url = server.url("/AlunosAtendidosPNAE");
    let config = CliConfig::parse_from([
        "pnae-lp",
        "--resources",
        resources_url.as_str(),
        "--students",
        students_url.as_str(),
        "--output-path",
        output.as_str(),
        "--no-solve",
    ]);
    assert!(config.validate().is_ok());

    let storage = LocalStorage::new(output.clone());
    let pipeline = AllocationPipeline::with_external_solver(storage, config);
    let outcome = EtlEngine::new(pipeline).run().await.unwrap();

    resources_mock.assert();
    students_mock.assert();
    assert_eq!(outcome.variable_count, 2);
    assert!(outcome.solver.is_none());
    assert!(temp_dir.path().join("modelo.lp").exists());
    assert!(temp_dir.path().join("aggregados.csv").exists());
}

#[tokio::test]
async fn test_missing_value_key_aborts_before_writing() {
    let temp_dir = TempDir::new().unwrap();
    let resources = write_json(
        temp_dir.path(),
        "resources.json",
        serde_json::json!({"items": []}),
    );
    let students = write_json(temp_dir.path(), "students.json", students_doc());
    let output_path = temp_dir.path().join("out");
    let output = output_path.to_str().unwrap().to_string();

    let config = toml_config(&resources, &students, &output, "");
    let storage = LocalStorage::new(output);
    let pipeline = AllocationPipeline::with_external_solver(storage, config);

    let result = EtlEngine::new(pipeline).run().await;

    match result {
        Err(LpError::MissingInputError { key, .. }) => assert_eq!(key, "value"),
        other => panic!("expected MissingInputError, got {:?}", other.map(|o| o.model_path)),
    }
    assert!(!output_path.join("modelo.lp").exists());
}

#[tokio::test]
async fn test_all_records_malformed_yields_empty_model_error() {
    let temp_dir = TempDir::new().unwrap();
    let resources = write_json(
        temp_dir.path(),
        "resources.json",
        serde_json::json!({"value": [{"Municipio": "C", "Vl_total_escolas": "abc"}]}),
    );
    let students = write_json(
        temp_dir.path(),
        "students.json",
        serde_json::json!({"value": []}),
    );
    let output = temp_dir.path().to_str().unwrap().to_string();

    let config = toml_config(&resources, &students, &output, "");
    let storage = LocalStorage::new(output);
    let pipeline = AllocationPipeline::with_external_solver(storage, config);

    let err = EtlEngine::new(pipeline).run().await.unwrap_err();

    assert!(matches!(err, LpError::EmptyModelError));
    assert!(!temp_dir.path().join("modelo.lp").exists());
}

#[tokio::test]
async fn test_failing_solver_surfaces_error_after_model_is_written() {
    let temp_dir = TempDir::new().unwrap();
    let resources = write_json(temp_dir.path(), "resources.json", resources_doc());
    let students = write_json(temp_dir.path(), "students.json", students_doc());
    let output = temp_dir.path().to_str().unwrap().to_string();

    let mut config = toml_config(&resources, &students, &output, "");
    if let Some(solver) = config.solver.as_mut() {
        solver.args = Some(vec!["-c".to_string(), "echo broken >&2; exit 3".to_string()]);
    }

    let storage = LocalStorage::new(output);
    let pipeline = AllocationPipeline::with_external_solver(storage, config);

    let err = EtlEngine::new(pipeline).run().await.unwrap_err();

    match &err {
        LpError::SolverInvocationError { command, reason } => {
            assert_eq!(command, "sh");
            assert!(reason.contains("broken"));
        }
        other => panic!("expected SolverInvocationError, got {:?}", other),
    }
    assert!(temp_dir.path().join("modelo.lp").exists());
}
