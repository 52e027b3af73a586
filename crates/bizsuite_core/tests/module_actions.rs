use bizsuite_core::{
    ActionRequest, CrmModule, FormsModule, ModuleContext, ProjectsModule, ReportsModule,
    SessionSnapshot, SuiteModule,
};
use serde_json::{json, Value};
use std::fs;
use tempfile::TempDir;

fn context(dir: &TempDir) -> ModuleContext {
    ModuleContext::new(dir.path(), SessionSnapshot::with_user("ana"))
}

fn run(module: &dyn SuiteModule, ctx: &ModuleContext, action: &str, params: Value) -> Value {
    module
        .execute(ctx, &ActionRequest::new(action, params))
        .unwrap()
        .to_json()
}

#[test]
fn added_clients_get_sequential_ids_in_insertion_order() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);

    for name in ["Acme", "Globex", "Initech"] {
        let result = run(&CrmModule, &ctx, "add_cliente", json!({"nombre": name}));
        assert_eq!(result["message"], "Client created");
    }

    let data = CrmModule.fetch_all(&ctx).unwrap();
    let clients = data["clientes"].as_array().unwrap();
    let ids: Vec<u64> = clients.iter().map(|c| c["id"].as_u64().unwrap()).collect();
    let names: Vec<&str> = clients.iter().map(|c| c["nombre"].as_str().unwrap()).collect();
    assert_eq!(ids, [1, 2, 3]);
    assert_eq!(names, ["Acme", "Globex", "Initech"]);
    assert!(clients.iter().all(|c| c["estado"] == "activo"));
}

#[test]
fn interactions_record_the_session_actor() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);
    let result = run(
        &CrmModule,
        &ctx,
        "add_contacto",
        json!({"cliente_id": 1, "tipo": "email", "notas": "follow-up"}),
    );
    assert_eq!(result["contacto"]["usuario"], "ana");
    assert_eq!(result["contacto"]["tipo"], "email");

    let anonymous = ModuleContext::new(dir.path(), SessionSnapshot::new());
    let result = run(&CrmModule, &anonymous, "add_contacto", json!({}));
    assert_eq!(result["contacto"]["usuario"], "Sistema");
    assert_eq!(result["contacto"]["tipo"], "llamada");
}

#[test]
fn unknown_action_returns_error_descriptor() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);

    for module in [
        &CrmModule as &dyn SuiteModule,
        &ProjectsModule,
        &FormsModule,
        &ReportsModule,
    ] {
        let reply = module
            .execute(&ctx, &ActionRequest::new("drop_everything", json!({})))
            .unwrap();
        assert_eq!(reply.error(), Some("unknown action: drop_everything"));
    }
    for file in ["crm_clientes.json", "proyectos.json", "formularios.json", "informes.json"] {
        assert!(!dir.path().join(file).exists(), "{file} should not be written");
    }
}

#[test]
fn invalid_params_are_rejected_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);
    let reply = CrmModule
        .execute(
            &ctx,
            &ActionRequest::new("add_oportunidad", json!({"valor": "a lot"})),
        )
        .unwrap();
    let error = reply.error().unwrap();
    assert!(error.starts_with("invalid params for add_oportunidad"), "{error}");
    assert!(!dir.path().join("crm_clientes.json").exists());
}

#[test]
fn not_found_updates_leave_store_bytes_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);
    run(&ProjectsModule, &ctx, "add_proyecto", json!({"nombre": "Site"}));
    run(
        &ProjectsModule,
        &ctx,
        "add_tarea",
        json!({"proyecto_id": 1, "titulo": "Design", "tiempo_estimado": 5}),
    );
    let path = dir.path().join("proyectos.json");
    let before = fs::read(&path).unwrap();

    let cases = [
        ("update_tarea_estado", json!({"id": 42, "estado": "completada"}), "task not found"),
        ("registrar_tiempo", json!({"id": 42, "horas": 3}), "task not found"),
        ("update_estado_proyecto", json!({"id": 9, "estado": "completado"}), "project not found"),
    ];
    for (action, params, expected) in cases {
        let result = run(&ProjectsModule, &ctx, action, params);
        assert_eq!(result, json!({"error": expected}));
    }

    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn crm_and_forms_not_found_updates_leave_store_bytes_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);
    run(&CrmModule, &ctx, "add_cliente", json!({"nombre": "Acme"}));
    run(&CrmModule, &ctx, "add_oportunidad", json!({"titulo": "Deal", "cliente_id": 1}));
    let crm_path = dir.path().join("crm_clientes.json");
    let crm_before = fs::read(&crm_path).unwrap();

    let cases = [
        (
            "update_estado_oportunidad",
            json!({"id": 9, "estado": "ganada"}),
            "opportunity not found",
        ),
        ("update_estado_cliente", json!({"id": 9, "estado": "inactivo"}), "client not found"),
    ];
    for (action, params, expected) in cases {
        let result = run(&CrmModule, &ctx, action, params);
        assert_eq!(result, json!({"error": expected}));
    }
    assert_eq!(fs::read(&crm_path).unwrap(), crm_before);

    run(&FormsModule, &ctx, "create_formulario", json!({"titulo": "Intake"}));
    let forms_path = dir.path().join("formularios.json");
    let forms_before = fs::read(&forms_path).unwrap();
    let result = run(&FormsModule, &ctx, "toggle_formulario", json!({"id": 5}));
    assert_eq!(result, json!({"error": "form not found"}));
    assert_eq!(fs::read(&forms_path).unwrap(), forms_before);
}

#[test]
fn client_status_update_moves_active_count() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);
    run(&CrmModule, &ctx, "add_cliente", json!({"nombre": "Acme"}));
    run(&CrmModule, &ctx, "add_cliente", json!({"nombre": "Globex"}));
    assert_eq!(CrmModule.summarize(&ctx).unwrap()["clientes_activos"], 2);

    let result = run(
        &CrmModule,
        &ctx,
        "update_estado_cliente",
        json!({"id": 1, "estado": "inactivo"}),
    );
    assert_eq!(result["message"], "Status updated");
    assert_eq!(result["cliente"]["estado"], "inactivo");

    let summary = CrmModule.summarize(&ctx).unwrap();
    assert_eq!(summary["total_clientes"], 2);
    assert_eq!(summary["clientes_activos"], 1);
}

#[test]
fn opportunity_probability_out_of_range_is_rejected_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);
    let result = run(
        &CrmModule,
        &ctx,
        "add_oportunidad",
        json!({"titulo": "Deal", "probabilidad": 150}),
    );
    let error = result["error"].as_str().unwrap();
    assert!(error.starts_with("invalid params for add_oportunidad"), "{error}");
    assert!(!dir.path().join("crm_clientes.json").exists());

    let created = run(
        &CrmModule,
        &ctx,
        "add_oportunidad",
        json!({"titulo": "Deal", "valor": null, "probabilidad": null}),
    );
    assert_eq!(created["oportunidad"]["valor"], 0.0);
    assert_eq!(created["oportunidad"]["probabilidad"], 50);
}

#[test]
fn task_lifecycle_tracks_hours_and_completion() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);
    run(&ProjectsModule, &ctx, "add_tarea", json!({"titulo": "Build"}));

    let logged = run(&ProjectsModule, &ctx, "registrar_tiempo", json!({"id": 1, "horas": 2.5}));
    assert_eq!(logged["message"], "Registered 2.5 hours");
    assert_eq!(logged["tarea"]["tiempo_real"], 2.5);

    let done = run(
        &ProjectsModule,
        &ctx,
        "update_tarea_estado",
        json!({"id": 1, "estado": "completada"}),
    );
    assert_eq!(done["tarea"]["estado"], "completada");
    assert!(done["tarea"]["fecha_completada"].is_string());

    let summary = ProjectsModule.summarize(&ctx).unwrap();
    assert_eq!(summary["tareas_completadas"], 1);
    assert_eq!(summary["progreso_general"], 100);
}

#[test]
fn submitted_responses_bump_the_parent_form_counter() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);
    run(
        &FormsModule,
        &ctx,
        "create_formulario",
        json!({
            "titulo": "Satisfaction",
            "campos": [{"name": "score", "label": "Score", "type": "number", "required": true}]
        }),
    );

    for score in [4, 5] {
        let result = run(
            &FormsModule,
            &ctx,
            "submit_respuesta",
            json!({"formulario_id": 1, "respuestas": {"score": score}}),
        );
        assert_eq!(result["respuesta"]["usuario"], "Anónimo");
    }
    let dangling = run(
        &FormsModule,
        &ctx,
        "submit_respuesta",
        json!({"formulario_id": 7, "respuestas": {}}),
    );
    assert_eq!(dangling["respuesta"]["id"], 3);

    let data = FormsModule.fetch_all(&ctx).unwrap();
    assert_eq!(data["formularios"][0]["respuestas_count"], 2);
    assert_eq!(data["respuestas"].as_array().unwrap().len(), 3);

    let listed = run(&FormsModule, &ctx, "get_respuestas", json!({"formulario_id": 1}));
    assert_eq!(listed["respuestas"].as_array().unwrap().len(), 2);

    let summary = FormsModule.summarize(&ctx).unwrap();
    assert_eq!(summary["formulario_popular"], "Satisfaction");
    assert_eq!(summary["respuestas_popular"], 2);
}

#[test]
fn toggling_a_form_flips_active_flag() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);
    run(&FormsModule, &ctx, "create_formulario", json!({"titulo": "Signup"}));

    let toggled = run(&FormsModule, &ctx, "toggle_formulario", json!({"id": 1}));
    assert_eq!(toggled["formulario"]["activo"], false);
    let missing = run(&FormsModule, &ctx, "toggle_formulario", json!({"id": 2}));
    assert_eq!(missing, json!({"error": "form not found"}));

    let summary = FormsModule.summarize(&ctx).unwrap();
    assert_eq!(summary["formularios_activos"], 0);
}

#[test]
fn fetch_all_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);
    run(&CrmModule, &ctx, "add_cliente", json!({"nombre": "Acme"}));
    run(
        &CrmModule,
        &ctx,
        "add_oportunidad",
        json!({"cliente_id": 1, "titulo": "Renewal", "valor": 1200}),
    );

    let first = serde_json::to_string(&CrmModule.fetch_all(&ctx).unwrap()).unwrap();
    let second = serde_json::to_string(&CrmModule.fetch_all(&ctx).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn fetch_all_on_empty_data_dir_returns_empty_collections() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);
    let data = CrmModule.fetch_all(&ctx).unwrap();
    assert_eq!(
        data,
        json!({"clientes": [], "contactos": [], "oportunidades": []})
    );
}

#[test]
fn corrupt_document_surfaces_as_module_error() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(&dir);
    fs::write(dir.path().join("formularios.json"), "{not json").unwrap();

    let err = FormsModule.fetch_all(&ctx).unwrap_err();
    assert!(err.to_string().contains("formularios.json"));

    let reply = FormsModule.execute(&ctx, &ActionRequest::new("create_formulario", json!({})));
    assert!(reply.is_err());
    assert_eq!(
        fs::read_to_string(dir.path().join("formularios.json")).unwrap(),
        "{not json"
    );
}
