// ==========================================
// 测试数据生成器
// ==========================================
// 用途: 生成4个结算包JSON数据集 (CLI 运行器输入格式)
// 输出: tests/fixtures/datasets/*.json
// 运行: cargo run --bin generate_test_data
// ==========================================

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use coldstore_billing::domain::{
    AppliedTariff, DailyInventory, FormData, FormOperation, ItemRow, ManualDetails,
    ManualOperation, ObservacionRegistro, OperationRecord, RoleCount,
};
use coldstore_billing::repository::ArticleSession;
use coldstore_billing::{
    BillingConcept, CalculationBase, CalculationType, FormKind, OperationFlow, ProductFilter,
    SpecificTariff, TariffRange, TariffType, TemperatureRange,
};
use serde::Serialize;
use std::error::Error;
use std::fs;

// 结算包结构与 CLI 运行器的输入约定一致
#[derive(Serialize)]
struct SettlementBundle {
    client: String,
    desde: NaiveDate,
    hasta: NaiveDate,
    concepts: Vec<BillingConcept>,
    operations: Vec<OperationRecord>,
    articles: Vec<ArticleSession>,
    inventory: Vec<DailyInventory>,
}

// ==========================================
// 时间与概念构造
// ==========================================

// 2024年3月本地时刻 (UTC-5) 换算为 UTC 时间戳
fn march_local(d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, d, h, 0, 0).unwrap() + Duration::hours(5)
}

fn base_concept(name: &str, base: CalculationBase, value: Option<f64>) -> BillingConcept {
    BillingConcept {
        concept_name: name.to_string(),
        calculation_type: CalculationType::Rules,
        tariff_type: TariffType::Unique,
        calculation_base: base,
        value,
        tariff_ranges: vec![],
        tariff_ranges_temperature: vec![],
        specific_tariffs: vec![],
        weekday_day_shift_start: Some("06:00".to_string()),
        weekday_day_shift_end: Some("18:00".to_string()),
        saturday_day_shift_start: Some("06:00".to_string()),
        saturday_day_shift_end: Some("13:00".to_string()),
        day_shift_end_time: Some("19:00".to_string()),
        filter_operation_type: OperationFlow::Ambas,
        filter_product_type: ProductFilter::Ambos,
        filter_pedido_types: vec![],
        filter_sesion: None,
        associated_observation: None,
        inventory_sesion: None,
        inventory_source: None,
        unit_of_measure: None,
        billing_period: Default::default(),
    }
}

fn storage_concept() -> BillingConcept {
    let mut c = base_concept("ALMACENAMIENTO CONGELADOS", CalculationBase::Toneladas, Some(12.0));
    c.filter_sesion = Some("CONGELADOS".to_string());
    c
}

fn loading_concept(name: &str, flow: OperationFlow) -> BillingConcept {
    let mut c = base_concept(name, CalculationBase::Toneladas, None);
    c.tariff_type = TariffType::Ranges;
    c.filter_operation_type = flow;
    c.tariff_ranges = vec![
        TariffRange {
            min_tons: 0.0,
            max_tons: 10.0,
            day_tariff: 85.0,
            night_tariff: 110.0,
            extra_tariff: 140.0,
            vehicle_type: Some("SENCILLO".to_string()),
        },
        TariffRange {
            min_tons: 10.1,
            max_tons: 35.0,
            day_tariff: 130.0,
            night_tariff: 165.0,
            extra_tariff: 210.0,
            vehicle_type: Some("TRACTOMULA".to_string()),
        },
    ];
    c
}

fn temperature_concept() -> BillingConcept {
    let mut c = base_concept("CONGELACION POR TEMPERATURA", CalculationBase::Kilogramos, None);
    c.tariff_type = TariffType::ByTemperature;
    c.filter_operation_type = OperationFlow::Recepcion;
    c.tariff_ranges_temperature = vec![
        TemperatureRange {
            min_temp: -10.0,
            max_temp: 5.0,
            rate_per_kg: 0.8,
        },
        TemperatureRange {
            min_temp: -30.0,
            max_temp: -10.1,
            rate_per_kg: 1.6,
        },
    ];
    c
}

fn observation_concept() -> BillingConcept {
    let mut c = base_concept("REESTIBADO", CalculationBase::Paletas, Some(18.0));
    c.calculation_type = CalculationType::Observation;
    c.associated_observation = Some("REESTIBADO".to_string());
    c
}

fn manual_concept() -> BillingConcept {
    let mut c = base_concept("SERVICIOS VARIOS", CalculationBase::Operaciones, None);
    c.calculation_type = CalculationType::Manual;
    c.tariff_type = TariffType::Specific;
    c.specific_tariffs = vec![
        SpecificTariff {
            id: "SV-01".to_string(),
            name: "TERMOREGISTRO".to_string(),
            value: 35.0,
            unit: Some("UNIDAD".to_string()),
            base_quantity: None,
        },
        SpecificTariff {
            id: "SV-02".to_string(),
            name: "SELLADO DE CONTENEDOR".to_string(),
            value: 22.0,
            unit: Some("UNIDAD".to_string()),
            base_quantity: None,
        },
    ];
    c
}

fn crew_concept() -> BillingConcept {
    let mut c = base_concept("HORA EXTRA CUADRILLA ADICIONAL", CalculationBase::Operaciones, None);
    c.calculation_type = CalculationType::Manual;
    c.tariff_type = TariffType::Specific;
    c.specific_tariffs = vec![
        SpecificTariff {
            id: "HE-01".to_string(),
            name: "OPERARIO DIURNA".to_string(),
            value: 9.5,
            unit: Some("HORA".to_string()),
            base_quantity: None,
        },
        SpecificTariff {
            id: "HE-02".to_string(),
            name: "OPERARIO NOCTURNA".to_string(),
            value: 14.0,
            unit: Some("HORA".to_string()),
            base_quantity: None,
        },
        SpecificTariff {
            id: "HE-03".to_string(),
            name: "MONTACARGUISTA DIURNA".to_string(),
            value: 12.0,
            unit: Some("HORA".to_string()),
            base_quantity: None,
        },
        SpecificTariff {
            id: "HE-04".to_string(),
            name: "MONTACARGUISTA NOCTURNA".to_string(),
            value: 17.5,
            unit: Some("HORA".to_string()),
            base_quantity: None,
        },
    ];
    c
}

fn positions_concept() -> BillingConcept {
    let mut c = base_concept("POSICIONES FIJAS CONGELADOS", CalculationBase::Posiciones, None);
    c.calculation_type = CalculationType::Manual;
    c.tariff_type = TariffType::Specific;
    c.specific_tariffs = vec![SpecificTariff {
        id: "POS-01".to_string(),
        name: "POSICIONES RESERVADAS".to_string(),
        value: 7.5,
        unit: Some("POSICION".to_string()),
        base_quantity: Some(40.0),
    }];
    c
}

fn inventory_concept() -> BillingConcept {
    let mut c = base_concept("ALMACENAMIENTO POR POSICIONES", CalculationBase::Posiciones, Some(6.0));
    c.calculation_type = CalculationType::BalanceInventory;
    c.inventory_sesion = Some("CONGELADOS".to_string());
    c.inventory_source = Some("SISLOG".to_string());
    c
}

fn container_concept() -> BillingConcept {
    let mut c = base_concept("ALMACENAMIENTO CONTENEDOR", CalculationBase::Paletas, Some(4.5));
    c.calculation_type = CalculationType::BalanceContainer;
    c
}

fn freezing_service_concept() -> BillingConcept {
    let mut c = base_concept("SERVICIO DE CONGELACION", CalculationBase::Kilogramos, Some(1.2));
    c.calculation_type = CalculationType::SpecialLogic;
    c
}

fn post_freezing_storage_concept() -> BillingConcept {
    let mut c = base_concept("ALMACENAMIENTO POST CONGELACION", CalculationBase::Paletas, Some(3.8));
    c.calculation_type = CalculationType::SpecialLogic;
    c
}

// ==========================================
// 作业记录构造
// ==========================================

// 固定重量表单: 汇总布局 (哨兵托盘号 0)
fn fixed_form(index: usize, client: &str, kind: FormKind, day: u32, hour: u32) -> OperationRecord {
    let kg = 2000.0 + (index % 7) as f64 * 1500.0;
    let pallets = 2.0 + (index % 5) as f64;
    OperationRecord::Formulario(FormOperation {
        id: format!("FRM{:05}", index + 1),
        client: client.to_string(),
        fecha: march_local(day, hour),
        form_kind: kind,
        tipo_pedido: Some("NACIONAL".to_string()),
        pedido_sislog: Some(format!("PED{:05}", index + 1)),
        placa: Some(["WXY789", "KJL432", "TRN015"][index % 3].to_string()),
        contenedor: None,
        tipo_vehiculo: Some(["SENCILLO", "TURBO", "TRACTOMULA"][index % 3].to_string()),
        hora_inicio: Some(format!("{:02}:00", hour)),
        hora_fin: Some(format!("{:02}:30", hour + 1)),
        observaciones: vec![],
        form_data: FormData {
            total_peso_bruto: Some(kg + pallets * 25.0),
            total_paletas: Some(pallets),
            productos: vec![ItemRow {
                codigo_producto: Some(format!("PRD{:03}", (index % 4) + 1)),
                descripcion: Some("PULPA DE FRUTA CONGELADA".to_string()),
                numero_paleta: Some(0),
                peso_neto: Some(kg),
                paletas: Some(pallets),
                cantidad: Some(pallets * 48.0),
                ..ItemRow::default()
            }],
            ..FormData::default()
        },
    })
}

// 变动重量表单: 明细布局, 逐托净重与批次号
fn lot_form(index: usize, client: &str, kind: FormKind, day: u32, lote: &str) -> OperationRecord {
    let items = (0..3)
        .map(|p| ItemRow {
            codigo_producto: Some("PRD101".to_string()),
            numero_paleta: Some((index * 10 + p + 1) as i64),
            peso_bruto: Some(520.0),
            tara_paleta: Some(20.0),
            peso_neto: Some(500.0),
            lote: Some(lote.to_string()),
            temperaturas: vec![-19.0, -18.5],
            ..ItemRow::default()
        })
        .collect();
    OperationRecord::Formulario(FormOperation {
        id: format!("VAR{:05}", index + 1),
        client: client.to_string(),
        fecha: march_local(day, 9),
        form_kind: kind,
        tipo_pedido: Some("NACIONAL".to_string()),
        pedido_sislog: Some(format!("PED9{:04}", index + 1)),
        placa: Some("GHT654".to_string()),
        contenedor: None,
        tipo_vehiculo: Some("SENCILLO".to_string()),
        hora_inicio: Some("09:00".to_string()),
        hora_fin: Some("11:00".to_string()),
        observaciones: vec![],
        form_data: FormData {
            items,
            ..FormData::default()
        },
    })
}

// 集装箱表单: 出入库带同一箱号
fn container_form(index: usize, client: &str, kind: FormKind, day: u32, pallets: f64) -> OperationRecord {
    let mut record = fixed_form(index, client, kind, day, 10);
    if let OperationRecord::Formulario(f) = &mut record {
        f.contenedor = Some("MSKU7012345".to_string());
        f.form_data.productos[0].paletas = Some(pallets);
        f.form_data.total_paletas = Some(pallets);
    }
    record
}

// 手工客户作业: 引用专项费率
fn manual_record(index: usize, client: &str, concepto: &str, day: u32, applied: Vec<(&str, f64)>) -> OperationRecord {
    OperationRecord::ManualCliente(ManualOperation {
        id: format!("MAN{:05}", index + 1),
        client: client.to_string(),
        concepto: concepto.to_string(),
        fecha: march_local(day, 14),
        specific_tariffs: applied
            .into_iter()
            .map(|(id, cantidad)| AppliedTariff {
                tariff_id: id.to_string(),
                cantidad: Some(cantidad),
            })
            .collect(),
        detalles: ManualDetails {
            placa: Some("TRK555".to_string()),
            observacion: Some("SERVICIO SOLICITADO POR EL CLIENTE".to_string()),
            ..ManualDetails::default()
        },
    })
}

// 手工装卸队作业: 时段与到场角色人数
fn crew_record(
    index: usize,
    client: &str,
    concepto: &str,
    day: u32,
    hora_inicio: &str,
    hora_fin: &str,
    personal: Vec<(&str, u32)>,
) -> OperationRecord {
    OperationRecord::ManualCuadrilla(ManualOperation {
        id: format!("CDR{:05}", index + 1),
        client: client.to_string(),
        concepto: concepto.to_string(),
        fecha: march_local(day, 16),
        specific_tariffs: vec![],
        detalles: ManualDetails {
            hora_inicio: Some(hora_inicio.to_string()),
            hora_fin: Some(hora_fin.to_string()),
            personal: personal
                .into_iter()
                .map(|(rol, numero_personas)| RoleCount {
                    rol: rol.to_string(),
                    numero_personas,
                })
                .collect(),
            ..ManualDetails::default()
        },
    })
}

fn write_bundle(path: &str, bundle: &SettlementBundle) -> Result<(), Box<dyn Error>> {
    fs::write(path, serde_json::to_string_pretty(bundle)?)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("开始生成测试数据集...");
    fs::create_dir_all("tests/fixtures/datasets")?;

    // 1. 基础月度结算包 (仓储 + 装卸区间)
    generate_basic_month()?;

    // 2. 全策略结算包 (测温/观察项/手工/装卸队/包月/库存/集装箱)
    generate_full_strategies()?;

    // 3. 批次冻结专项客户结算包
    generate_lot_freezing_client()?;

    // 4. 空作业结算包 (概念有配置但无作业)
    generate_empty_operations()?;

    println!("✓ 所有测试数据集生成完成！");
    Ok(())
}

fn generate_basic_month() -> Result<(), Box<dyn Error>> {
    let mut operations = Vec::new();
    // 三月每隔一天一张入库单, 隔两天一张出库单
    for i in 0..15 {
        let day = (i * 2 + 1) as u32;
        operations.push(fixed_form(i, "CLI001", FormKind::FijoRecepcion, day, 8 + (i % 3) as u32));
    }
    for i in 0..10 {
        let day = (i * 3 + 2) as u32;
        operations.push(fixed_form(i + 100, "CLI001", FormKind::FijoDespacho, day, 15));
    }

    let bundle = SettlementBundle {
        client: "CLI001".to_string(),
        desde: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        hasta: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        concepts: vec![
            storage_concept(),
            loading_concept("CARGUE", OperationFlow::Despacho),
            loading_concept("DESCARGUE", OperationFlow::Recepcion),
        ],
        operations,
        articles: vec![
            ArticleSession {
                codigo: "PRD001".to_string(),
                sesion: "CONGELADOS".to_string(),
            },
            ArticleSession {
                codigo: "PRD002".to_string(),
                sesion: "CONGELADOS".to_string(),
            },
            ArticleSession {
                codigo: "PRD003".to_string(),
                sesion: "CONGELADOS".to_string(),
            },
            ArticleSession {
                codigo: "PRD004".to_string(),
                sesion: "REFRIGERADOS".to_string(),
            },
        ],
        inventory: vec![],
    };
    write_bundle("tests/fixtures/datasets/01_mes_basico.json", &bundle)?;
    println!("✓ 生成 01_mes_basico.json (25张表单, 3个概念)");
    Ok(())
}

fn generate_full_strategies() -> Result<(), Box<dyn Error>> {
    let mut operations = Vec::new();

    // 入库单带测温与观察项登记
    for i in 0..6 {
        let day = (i * 4 + 2) as u32;
        let mut record = fixed_form(i + 200, "CLI002", FormKind::FijoRecepcion, day, 10);
        if let OperationRecord::Formulario(f) = &mut record {
            f.form_data.productos[0].temperatura1 = Some(-17.0 - i as f64);
            f.form_data.productos[0].temperatura2 = Some(-16.0 - i as f64);
            if i % 2 == 0 {
                f.observaciones.push(ObservacionRegistro {
                    tipo: "REESTIBADO".to_string(),
                    cantidad: Some(3.0 + i as f64),
                    fecha: None,
                });
            }
        }
        operations.push(record);
    }

    // 集装箱入库与部分出库
    operations.push(container_form(300, "CLI002", FormKind::FijoRecepcion, 4, 12.0));
    operations.push(container_form(301, "CLI002", FormKind::FijoDespacho, 18, 5.0));

    // 手工作业与装卸队加班
    operations.push(manual_record(400, "CLI002", "SERVICIOS VARIOS", 7, vec![("SV-01", 2.0), ("SV-02", 1.0)]));
    operations.push(manual_record(401, "CLI002", "SERVICIOS VARIOS", 21, vec![("SV-01", 1.0)]));
    operations.push(manual_record(402, "CLI002", "POSICIONES FIJAS CONGELADOS", 1, vec![]));
    operations.push(crew_record(
        500,
        "CLI002",
        "HORA EXTRA CUADRILLA ADICIONAL",
        12,
        "17:00",
        "22:00",
        vec![("OPERARIO", 4), ("MONTACARGUISTA", 1)],
    ));

    // 库存日报 (三月前十天)
    let inventory = (1..=10)
        .map(|d| DailyInventory {
            fecha: NaiveDate::from_ymd_opt(2024, 3, d).unwrap(),
            posiciones: 55.0 + (d % 4) as f64 * 5.0,
            camara: Some("CONGELADOS".to_string()),
        })
        .collect();

    let bundle = SettlementBundle {
        client: "CLI002".to_string(),
        desde: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        hasta: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        concepts: vec![
            temperature_concept(),
            observation_concept(),
            manual_concept(),
            crew_concept(),
            positions_concept(),
            inventory_concept(),
            container_concept(),
        ],
        operations,
        articles: vec![ArticleSession {
            codigo: "PRD001".to_string(),
            sesion: "CONGELADOS".to_string(),
        }],
        inventory,
    };
    write_bundle("tests/fixtures/datasets/02_estrategias_completas.json", &bundle)?;
    println!("✓ 生成 02_estrategias_completas.json (7个概念全策略覆盖)");
    Ok(())
}

fn generate_lot_freezing_client() -> Result<(), Box<dyn Error>> {
    // 客户编码与批次冻结专项规则登记表一致
    let client = "830512774";
    let operations = vec![
        lot_form(600, client, FormKind::VariableRecepcion, 3, "L-2403-A"),
        lot_form(601, client, FormKind::VariableRecepcion, 8, "L-2403-B"),
        lot_form(602, client, FormKind::VariableDespacho, 15, "L-2403-A"),
    ];

    let bundle = SettlementBundle {
        client: client.to_string(),
        desde: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        hasta: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        concepts: vec![freezing_service_concept(), post_freezing_storage_concept()],
        operations,
        articles: vec![],
        inventory: vec![],
    };
    write_bundle("tests/fixtures/datasets/03_cliente_congelacion.json", &bundle)?;
    println!("✓ 生成 03_cliente_congelacion.json (批次冻结专项客户)");
    Ok(())
}

fn generate_empty_operations() -> Result<(), Box<dyn Error>> {
    let bundle = SettlementBundle {
        client: "CLI404".to_string(),
        desde: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        hasta: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        concepts: vec![storage_concept()],
        operations: vec![],
        articles: vec![],
        inventory: vec![],
    };
    write_bundle("tests/fixtures/datasets/04_sin_operaciones.json", &bundle)?;
    println!("✓ 生成 04_sin_operaciones.json (无作业对照组)");
    Ok(())
}
