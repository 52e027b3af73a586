use bizsuite_core::{
    ActionRequest, CrmModule, FormsModule, ModuleContext, ProjectsModule, ReportsModule,
    SessionSnapshot, SuiteModule,
};
use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;

fn context(dir: &TempDir) -> ModuleContext {
    ModuleContext::new(dir.path(), SessionSnapshot::with_user("lucia"))
}

fn run(module: &dyn SuiteModule, ctx: &ModuleContext, action: &str, params: Value) -> Value {
    module
        .execute(ctx, &ActionRequest::new(action, params))
        .unwrap()
        .to_json()
}

fn generate(ctx: &ModuleContext, kind: &str) -> Value {
    let result = run(&ReportsModule, ctx, "generar_informe", json!({"tipo": kind}));
    assert_eq!(result["message"], "Report generated");
    result["informe"].clone()
}

#[test]
fn sales_report_on_empty_suite_has_zero_conversion() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);

    let report = generate(&ctx, "ventas");
    assert_eq!(report["tipo"], "ventas");
    assert_eq!(report["contenido"]["total_oportunidades"], 0);
    assert_eq!(report["contenido"]["tasa_conversion"], 0.0);
    assert_eq!(report["generado_por"], "lucia");
}

#[test]
fn sales_report_counts_pipeline_and_won_value() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);
    run(&CrmModule, &ctx, "add_oportunidad", json!({"titulo": "A", "valor": 100}));
    run(&CrmModule, &ctx, "add_oportunidad", json!({"titulo": "B", "valor": 50}));
    run(
        &CrmModule,
        &ctx,
        "update_estado_oportunidad",
        json!({"id": 2, "estado": "ganada"}),
    );

    let content = generate(&ctx, "ventas")["contenido"].clone();
    assert_eq!(content["valor_pipeline"], 100.0);
    assert_eq!(content["valor_ganado"], 50.0);
    assert_eq!(content["oportunidades_ganadas"], 1);
    assert_eq!(content["tasa_conversion"], 50.0);
}

#[test]
fn integration_report_links_clients_projects_and_forms() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);

    let empty = generate(&ctx, "integracion");
    assert_eq!(empty["contenido"]["tasa_integracion_clientes"], 0.0);

    run(&CrmModule, &ctx, "add_cliente", json!({"nombre": "Acme"}));
    run(&CrmModule, &ctx, "add_cliente", json!({"nombre": "Globex"}));
    run(&ProjectsModule, &ctx, "add_proyecto", json!({"nombre": "Portal", "cliente_id": 1}));
    run(&ProjectsModule, &ctx, "add_proyecto", json!({"nombre": "App", "cliente_id": 1}));
    run(&FormsModule, &ctx, "create_formulario", json!({"titulo": "Brief", "cliente_id": 2}));
    run(&FormsModule, &ctx, "create_formulario", json!({"titulo": "QA", "proyecto_id": 2}));
    run(&FormsModule, &ctx, "create_formulario", json!({"titulo": "Lost", "cliente_id": 40}));

    let content = generate(&ctx, "integracion")["contenido"].clone();
    assert_eq!(content["clientes_totales"], 2);
    assert_eq!(content["clientes_con_proyectos"], 1);
    assert_eq!(content["tasa_integracion_clientes"], 50.0);
    assert_eq!(content["formularios_vinculados_crm"], 1);
    assert_eq!(content["formularios_vinculados_proyectos"], 1);
}

#[test]
fn general_and_projects_reports_read_current_sibling_data() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);
    run(&ProjectsModule, &ctx, "add_proyecto", json!({"nombre": "Portal"}));
    run(
        &ProjectsModule,
        &ctx,
        "update_estado_proyecto",
        json!({"id": 1, "estado": "en_proceso"}),
    );
    run(
        &ProjectsModule,
        &ctx,
        "add_tarea",
        json!({"proyecto_id": 1, "tiempo_estimado": 8}),
    );
    run(&ProjectsModule, &ctx, "registrar_tiempo", json!({"id": 1, "horas": 10}));
    run(&FormsModule, &ctx, "create_formulario", json!({"titulo": "Intake"}));
    run(&CrmModule, &ctx, "add_oportunidad", json!({"titulo": "Deal"}));

    let general = generate(&ctx, "general")["contenido"].clone();
    assert_eq!(general["proyectos_totales"], 1);
    assert_eq!(general["formularios_activos"], 1);
    assert_eq!(general["oportunidades_abiertas"], 1);

    let projects = generate(&ctx, "proyectos")["contenido"].clone();
    assert_eq!(projects["estados"], json!({"en_proceso": 1}));
    assert_eq!(projects["horas_estimadas"], 8.0);
    assert_eq!(projects["horas_reales"], 10.0);
    assert_eq!(projects["desviacion_tiempo"], 2.0);
}

#[test]
fn report_history_is_append_only_and_never_touches_siblings() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);
    run(&CrmModule, &ctx, "add_cliente", json!({"nombre": "Acme"}));
    let first = generate(&ctx, "general");
    run(&CrmModule, &ctx, "add_cliente", json!({"nombre": "Globex"}));
    let crm_before = fs::read(dir.path().join("crm_clientes.json")).unwrap();
    let second = generate(&ctx, "general");
    assert_eq!(first["id"], 1);
    assert_eq!(second["id"], 2);

    let history = run(&ReportsModule, &ctx, "get_informes", json!({}));
    let reports = history["informes"].as_array().unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["contenido"]["clientes_totales"], 1);
    assert_eq!(reports[1]["contenido"]["clientes_totales"], 2);
    assert_eq!(fs::read(dir.path().join("crm_clientes.json")).unwrap(), crm_before);
    assert!(!dir.path().join("proyectos.json").exists());
    assert!(!dir.path().join("formularios.json").exists());

    let summary = ReportsModule.summarize(&ctx).unwrap();
    assert_eq!(
        summary,
        json!({"total_informes": 2, "tipo_popular": "general", "ultimo_informe": "general"})
    );
}

#[test]
fn unknown_report_kind_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);
    let result = run(&ReportsModule, &ctx, "generar_informe", json!({"tipo": "weekly"}));
    let error = result["error"].as_str().unwrap();
    assert!(error.starts_with("invalid params for generar_informe"), "{error}");
    assert!(!dir.path().join("informes.json").exists());
}

#[test]
fn missing_kind_defaults_to_general() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);
    let result = run(&ReportsModule, &ctx, "generar_informe", Value::Null);
    assert_eq!(result["informe"]["tipo"], "general");
    assert_eq!(result["informe"]["contenido"]["tipo"], "General Report");
}
