// ==========================================
// 结算流程端到端测试
// ==========================================
// 测试范围:
// 1. 通用概念端到端出账与排序
// 2. 跨夜装卸队加班
// 3. 集装箱余额的历史取数
// 4. 库存日报计费
// 5. 配置缺失与数据源缺索引的整单失败语义
// 6. 批次冻结专项客户
// ==========================================


use chrono::{DateTime, Utc};
use coldstore_billing::domain::{
    DailyInventory, FormData, FormOperation, ItemRow, OperationRecord, SettlementRequest,
};
use coldstore_billing::engine::{SettlementOrchestrator, SettlementSources};
use coldstore_billing::repository::{
    InMemoryArticleCatalog, InMemoryInventorySource, InMemoryOperationSource,
};
use coldstore_billing::{
    logging, BillingTables, CalculationBase, CalculationType, FormKind, OperationFlow,
};
use std::sync::Arc;
use test_helpers::*;

// ==========================================
// 辅助函数
// ==========================================

/// 编排器 + 内存数据源
fn orchestrator(
    operations: Vec<OperationRecord>,
    inventory: Vec<DailyInventory>,
    client: &str,
) -> SettlementOrchestrator {
    let sources = SettlementSources::new(
        Arc::new(InMemoryOperationSource::new(operations)),
        Arc::new(InMemoryArticleCatalog::empty()),
        Arc::new(InMemoryInventorySource::single_client(client, inventory)),
    );
    SettlementOrchestrator::new(sources, Arc::new(BillingTables::default()))
}

/// 带集装箱号的入出库表单
fn container_form(
    client: &str,
    contenedor: &str,
    kind: FormKind,
    fecha: DateTime<Utc>,
    pallets: f64,
) -> OperationRecord {
    match fixed_form("CT", client, kind, fecha, pallets * 500.0, pallets) {
        OperationRecord::Formulario(mut f) => {
            f.id = format!("OP-{contenedor}-{}", fecha.timestamp());
            f.contenedor = Some(contenedor.to_string());
            OperationRecord::Formulario(f)
        }
        other => other,
    }
}

/// 批次明细表单 (变动重量)
fn lot_form(
    client: &str,
    kind: FormKind,
    fecha: DateTime<Utc>,
    lote: &str,
    items: Vec<(i64, f64)>,
) -> OperationRecord {
    let mut data = FormData {
        items: items
            .into_iter()
            .map(|(paleta, neto)| ItemRow {
                lote: Some(lote.to_string()),
                numero_paleta: Some(paleta),
                peso_neto: Some(neto),
                ..ItemRow::default()
            })
            .collect(),
        ..FormData::default()
    };
    data.resolve_items_layout();
    OperationRecord::Formulario(FormOperation {
        id: format!("OP-{lote}-{}", fecha.timestamp()),
        client: client.to_string(),
        fecha,
        form_kind: kind,
        tipo_pedido: None,
        pedido_sislog: None,
        placa: None,
        contenedor: None,
        tipo_vehiculo: None,
        hora_inicio: None,
        hora_fin: None,
        observaciones: vec![],
        form_data: data,
    })
}

// ==========================================
// 通用概念端到端
// ==========================================

#[tokio::test]
async fn test_mixed_concepts_produce_sorted_bill() {
    // 场景1: 仓储 + 装卸两概念混合出账, 行序为日期 → 概念优先级
    logging::init_test();

    let storage = concept_unique("ALMACENAMIENTO CONGELADOS", CalculationBase::Toneladas, 10.0);
    let mut cargue = concept_ranges(
        "CARGUE",
        CalculationBase::Toneladas,
        vec![tariff_range(0.0, 10.0, 80.0, 120.0, 160.0)],
    );
    cargue.filter_operation_type = OperationFlow::Despacho;

    let ops = vec![
        // 2024-03-11 周一 / 2024-03-12 周二, 本地 10:00 作业
        fixed_form("A", "CLI001", FormKind::FijoRecepcion, utc_at_local(2024, 3, 11, 10, 0), 5000.0, 4.0),
        fixed_form("B", "CLI001", FormKind::FijoDespacho, utc_at_local(2024, 3, 12, 10, 0), 3000.0, 2.0),
    ];
    let request = request(
        "CLI001",
        date(2024, 3, 1),
        date(2024, 3, 31),
        vec![storage, cargue],
    );

    let outcome = orchestrator(ops, vec![], "CLI001").settle(&request).await;
    assert!(outcome.success, "结算应成功: {:?}", outcome.error);

    let run = outcome.run.unwrap();
    assert_eq!(run.client, "CLI001");
    assert_eq!(run.rows.len(), 3);

    // 3月11日仓储行在前
    assert_eq!(run.rows[0].fecha, date(2024, 3, 11));
    assert_eq!(run.rows[0].concepto, "ALMACENAMIENTO CONGELADOS");
    assert_eq!(run.rows[0].cantidad, 5.0);
    assert_eq!(run.rows[0].valor_total, 50.0);

    // 3月12日: 仓储行优先于装卸行
    assert_eq!(run.rows[1].concepto, "ALMACENAMIENTO CONGELADOS");
    assert_eq!(run.rows[1].valor_total, 30.0);
    assert_eq!(run.rows[2].concepto, "CARGUE");
    assert_eq!(run.rows[2].cantidad, 1.0, "装卸概念按趟计");
    assert_eq!(run.rows[2].unidad_medida, "VIAJE");
    assert_eq!(run.rows[2].valor_unitario, 80.0, "白班档位单价");
    assert_eq!(run.rows[2].operacion_logistica, "DESPACHO");
}

// ==========================================
// 装卸队加班
// ==========================================

#[tokio::test]
async fn test_overnight_crew_hours_stay_nocturnal() {
    // 场景2: 22:00-02:00 跨夜作业全部落入夜班段, 白班条目不出行
    logging::init_test();

    let tables = BillingTables::default();
    let mut crew = concept_manual(
        &tables.time_extra_fixed_concept,
        vec![
            specific_tariff("TE-D", "OPERARIO DIURNA", 10.0, Some(3.0)),
            specific_tariff("TE-N", "OPERARIO NOCTURNA", 15.0, Some(3.0)),
        ],
    );
    crew.day_shift_end_time = Some("19:00".to_string());

    let ops = vec![crew_operation(
        "CREW-1",
        "CLI001",
        &tables.time_extra_fixed_concept,
        utc_at_local(2024, 3, 11, 22, 0),
        "22:00",
        "02:00",
        vec![],
    )];
    let request = request("CLI001", date(2024, 3, 1), date(2024, 3, 31), vec![crew]);

    let outcome = orchestrator(ops, vec![], "CLI001").settle(&request).await;
    assert!(outcome.success, "结算应成功: {:?}", outcome.error);

    let rows = outcome.rows();
    assert_eq!(rows.len(), 1, "白班段零时长不出行");
    assert_eq!(rows[0].sub_concepto.as_deref(), Some("OPERARIO NOCTURNA"));
    assert_eq!(rows[0].cantidad, 12.0, "4 小时 x 3 人 = 12 人时");
    assert_eq!(rows[0].valor_total, 180.0);
    assert_eq!(rows[0].numero_personas, Some(3));
    assert_eq!(rows[0].fecha, date(2024, 3, 11));
}

// ==========================================
// 集装箱余额
// ==========================================

#[tokio::test]
async fn test_container_balance_uses_pre_range_history() {
    // 场景3: 区间前历史决定开账余额, 区间内逐日出行
    logging::init_test();

    let mut concept = concept_unique("ALMACENAMIENTO CONTENEDOR", CalculationBase::Paletas, 50.0);
    concept.calculation_type = CalculationType::BalanceContainer;
    concept.unit_of_measure = Some("PALETAS".to_string());

    let ops = vec![
        container_form("CLI001", "CONT-9", FormKind::FijoRecepcion, utc_at_local(2024, 2, 27, 9, 0), 10.0),
        container_form("CLI001", "CONT-9", FormKind::FijoDespacho, utc_at_local(2024, 2, 28, 9, 0), 4.0),
    ];
    let request = request("CLI001", date(2024, 3, 1), date(2024, 3, 3), vec![concept]);

    let outcome = orchestrator(ops, vec![], "CLI001").settle(&request).await;
    assert!(outcome.success, "结算应成功: {:?}", outcome.error);

    let rows = outcome.rows();
    assert_eq!(rows.len(), 3, "3 天每天一行");
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row.fecha, date(2024, 3, 1 + i as u32));
        assert_eq!(row.cantidad, 6.0, "开账余额 10 - 4 = 6");
        assert_eq!(row.valor_total, 300.0);
        assert_eq!(row.contenedor, "CONT-9");
    }
}

// ==========================================
// 库存日报
// ==========================================

#[tokio::test]
async fn test_inventory_balance_bills_daily_report() {
    // 场景4: 库存日报逐日计费, 零货位日不出行
    logging::init_test();

    let mut concept = concept_unique("ALMACENAMIENTO CONGELADOS", CalculationBase::Posiciones, 12.0);
    concept.calculation_type = CalculationType::BalanceInventory;
    concept.inventory_sesion = Some("CONGELADOS".to_string());
    concept.unit_of_measure = Some("POSICIONES".to_string());

    let inventory = vec![
        DailyInventory {
            fecha: date(2024, 3, 1),
            posiciones: 40.0,
            camara: None,
        },
        DailyInventory {
            fecha: date(2024, 3, 2),
            posiciones: 0.0,
            camara: None,
        },
    ];
    let request = request("CLI001", date(2024, 3, 1), date(2024, 3, 31), vec![concept]);

    let outcome = orchestrator(vec![], inventory, "CLI001").settle(&request).await;
    assert!(outcome.success, "结算应成功: {:?}", outcome.error);

    let rows = outcome.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].cantidad, 40.0);
    assert_eq!(rows[0].valor_total, 480.0);
    assert_eq!(rows[0].camara, "CONGELADOS");
}

// ==========================================
// 失败语义
// ==========================================

#[tokio::test]
async fn test_config_missing_fails_whole_run() {
    // 场景5: 单个概念配置缺失 → 整单失败, 不出部分账单
    logging::init_test();

    let tables = BillingTables::default();
    let good = concept_unique("MANIPULACION ENTRADA", CalculationBase::Toneladas, 10.0);
    let mut broken = concept_manual(
        &tables.time_extra_fixed_concept,
        vec![specific_tariff("TE-D", "OPERARIO DIURNA", 10.0, Some(2.0))],
    );
    broken.day_shift_end_time = None;

    let ops = vec![fixed_form(
        "A",
        "CLI001",
        FormKind::FijoRecepcion,
        utc_at_local(2024, 3, 11, 10, 0),
        5000.0,
        4.0,
    )];
    let request = request(
        "CLI001",
        date(2024, 3, 1),
        date(2024, 3, 31),
        vec![good, broken],
    );

    let outcome = orchestrator(ops, vec![], "CLI001").settle(&request).await;
    assert!(!outcome.success);
    assert!(outcome.rows().is_empty(), "失败时不返回部分账单");

    let error = outcome.error.unwrap();
    assert_eq!(error.kind, "CONFIG_MISSING");
    assert!(
        error.message.contains(&tables.time_extra_fixed_concept),
        "提示应点名出错概念: {}",
        error.message
    );
    assert!(error.remediation_url.is_none());
}

#[tokio::test]
async fn test_index_required_surfaces_console_url() {
    // 场景6: 数据源缺索引 → 失败结果携带建索引链接
    logging::init_test();

    let sources = SettlementSources::new(
        Arc::new(FailingOperationSource::index_required()),
        Arc::new(InMemoryArticleCatalog::empty()),
        Arc::new(InMemoryInventorySource::empty()),
    );
    let orchestrator = SettlementOrchestrator::new(sources, Arc::new(BillingTables::default()));
    let request = request(
        "CLI001",
        date(2024, 3, 1),
        date(2024, 3, 31),
        vec![concept_unique("MANIPULACION ENTRADA", CalculationBase::Toneladas, 10.0)],
    );

    let outcome = orchestrator.settle(&request).await;
    assert!(!outcome.success);
    let error = outcome.error.unwrap();
    assert_eq!(error.kind, "INDEX_REQUIRED");
    let url = error.remediation_url.expect("应提取出建索引链接");
    assert!(url.contains("create_composite=abc123"));
    assert!(error.message.contains(&url), "提示文本应内嵌链接");
}

// ==========================================
// 专项客户
// ==========================================

#[tokio::test]
async fn test_lot_freezing_client_settles_lots_end_to_end() {
    // 场景7: 批次冻结客户: 入库日冻结费 + 宽限后仓储费, 概念被专项策略消费
    logging::init_test();

    let tables = BillingTables::default();
    let rules = tables.special_clients.lot_freezing.clone();

    let mut freezing = concept_unique(&rules.freezing_concept, CalculationBase::Kilogramos, 2.0);
    freezing.calculation_type = CalculationType::SpecialLogic;
    let mut storage = concept_unique(&rules.storage_concept, CalculationBase::Paletas, 15.0);
    storage.calculation_type = CalculationType::SpecialLogic;

    let ops = vec![
        lot_form(
            &rules.client,
            FormKind::VariableRecepcion,
            utc_at_local(2024, 3, 1, 9, 0),
            "L-500",
            vec![(1, 400.0), (2, 600.0)],
        ),
        lot_form(
            &rules.client,
            FormKind::VariableDespacho,
            utc_at_local(2024, 3, 5, 9, 0),
            "L-500",
            vec![(1, 400.0), (2, 600.0)],
        ),
    ];
    let request = request(
        &rules.client,
        date(2024, 3, 1),
        date(2024, 3, 10),
        vec![freezing, storage],
    );

    let outcome = orchestrator(ops, vec![], &rules.client).settle(&request).await;
    assert!(outcome.success, "结算应成功: {:?}", outcome.error);

    let rows = outcome.rows();
    let freezing_rows: Vec<_> = rows
        .iter()
        .filter(|r| r.concepto == rules.freezing_concept)
        .collect();
    assert_eq!(freezing_rows.len(), 1, "专项概念不应再被通用策略重复结算");
    assert_eq!(freezing_rows[0].fecha, date(2024, 3, 1));
    assert_eq!(freezing_rows[0].cantidad, 1000.0);
    assert_eq!(freezing_rows[0].valor_total, 2000.0);
    assert_eq!(freezing_rows[0].sub_concepto.as_deref(), Some("L-500"));

    let storage_rows: Vec<_> = rows
        .iter()
        .filter(|r| r.concepto == rules.storage_concept)
        .collect();
    // 3月1日入库, 宽限2天 → 3月3日与3月4日 (3月5日出库日不计)
    assert_eq!(storage_rows.len(), 2);
    assert_eq!(storage_rows[0].fecha, date(2024, 3, 3));
    assert_eq!(storage_rows[1].fecha, date(2024, 3, 4));
    assert!(storage_rows.iter().all(|r| r.cantidad == 2.0));
}
