// ==========================================
// 冷链仓储计费结算 - 作业记录领域模型
// ==========================================
// 三类作业记录: 仓库表单 / 手工客户作业 / 手工装卸队作业
// 数值字段一律 Option, 缺失按 0 取值 (零默认策略, 不做校验报错)
// ==========================================

use crate::domain::types::{FormKind, ItemsLayout};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// 汇总布局哨兵托盘号: 行即汇总, 不代表实际托盘
pub const SUMMARY_PALLET_SENTINEL: i64 = 0;

// 散件哨兵托盘号: 每次出现都算一托, 不参与去重
pub const LOOSE_PALLET_SENTINEL: i64 = 999;

// ==========================================
// ItemRow - 表单明细行
// ==========================================
// 四处明细列表 (productos/items/destinos/placas) 共用同一行结构
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemRow {
    #[serde(default)]
    pub codigo_producto: Option<String>, // 货品编码（存储区归属依据）
    #[serde(default)]
    pub descripcion: Option<String>, // 货品描述
    #[serde(default)]
    pub numero_paleta: Option<i64>, // 托盘号（0=汇总哨兵, 999=散件哨兵）
    #[serde(default)]
    pub peso_bruto: Option<f64>, // 毛重（kg）
    #[serde(default)]
    pub tara_paleta: Option<f64>, // 托盘皮重（kg）
    #[serde(default)]
    pub peso_neto: Option<f64>, // 净重（kg）
    #[serde(default)]
    pub paletas: Option<f64>, // 托盘数（汇总布局行级合计）
    #[serde(default)]
    pub cantidad: Option<f64>, // 件数（箱/筐等计数单位）
    #[serde(default)]
    pub canastillas: Option<f64>, // 货筐数
    #[serde(default)]
    pub es_picking: bool, // 拣选行标记
    #[serde(default)]
    pub paletas_picking: Option<f64>, // 拣选托盘数
    #[serde(default)]
    pub lote: Option<String>, // 批次号（冻结批次跟踪依据）
    #[serde(default)]
    pub temperatura1: Option<f64>, // 测温1（固定重量表单, 摄氏度）
    #[serde(default)]
    pub temperatura2: Option<f64>, // 测温2
    #[serde(default)]
    pub temperatura3: Option<f64>, // 测温3
    #[serde(default)]
    pub temperaturas: Vec<f64>, // 逐托测温（变动重量表单）
}

impl ItemRow {
    /// 毛重, 缺失按 0
    pub fn gross_kg(&self) -> f64 {
        self.peso_bruto.unwrap_or(0.0)
    }

    /// 托盘皮重, 缺失按 0
    pub fn tare_kg(&self) -> f64 {
        self.tara_paleta.unwrap_or(0.0)
    }

    /// 净重, 缺失按 0
    pub fn net_kg(&self) -> f64 {
        self.peso_neto.unwrap_or(0.0)
    }

    /// 行级托盘合计, 缺失按 0
    pub fn pallet_count(&self) -> f64 {
        self.paletas.unwrap_or(0.0)
    }

    /// 件数, 缺失按 0
    pub fn unit_count(&self) -> f64 {
        self.cantidad.unwrap_or(0.0)
    }

    /// 货筐数, 缺失按 0
    pub fn basket_count(&self) -> f64 {
        self.canastillas.unwrap_or(0.0)
    }

    /// 是否拣选行（标记位或拣选托盘数 > 0）
    pub fn is_picking(&self) -> bool {
        self.es_picking || self.paletas_picking.unwrap_or(0.0) > 0.0
    }

    /// 本行可用测温读数, 最多取 3 个
    ///
    /// # 规则
    /// - 固定重量表单: temperatura1..3 中有值的
    /// - 变动重量表单: temperaturas 列表前 3 个
    pub fn temperature_readings(&self) -> Vec<f64> {
        if !self.temperaturas.is_empty() {
            return self.temperaturas.iter().copied().take(3).collect();
        }
        [self.temperatura1, self.temperatura2, self.temperatura3]
            .iter()
            .filter_map(|t| *t)
            .collect()
    }
}

// ==========================================
// DestinationGroup - 按目的地分组的明细
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DestinationGroup {
    #[serde(default)]
    pub destino: Option<String>, // 目的地名称
    #[serde(default)]
    pub items: Vec<ItemRow>, // 该目的地下的明细行
}

// ==========================================
// VehicleGroup - 按车辆分组的明细
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleGroup {
    #[serde(default)]
    pub placa: Option<String>, // 车牌号
    #[serde(default)]
    pub items: Vec<ItemRow>, // 该车辆下的明细行
}

// ==========================================
// ObservacionRegistro - 表单观察项登记
// ==========================================
// OBSERVATION 类概念的计数来源
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservacionRegistro {
    pub tipo: String, // 观察项类型（与概念 associated_observation 匹配）
    #[serde(default)]
    pub cantidad: Option<f64>, // 登记数量
    #[serde(default)]
    pub fecha: Option<DateTime<Utc>>, // 登记时间（缺失时回退表单时间）
}

// ==========================================
// FormData - 表单载荷
// ==========================================
// 四处明细列表并存, 缺失的列表贡献为空
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormData {
    #[serde(default)]
    pub total_peso_bruto: Option<f64>, // 整单毛重合计（固定重量表单预先合计）
    #[serde(default)]
    pub total_paletas: Option<f64>, // 整单托盘合计
    #[serde(default)]
    pub total_paletas_despacho: Option<f64>, // 出库托盘总计（按目的地拆分的出库单）
    #[serde(default)]
    pub productos: Vec<ItemRow>, // 货品明细
    #[serde(default)]
    pub items: Vec<ItemRow>, // 通用明细
    #[serde(default)]
    pub destinos: Vec<DestinationGroup>, // 按目的地分组明细
    #[serde(default)]
    pub placas: Vec<VehicleGroup>, // 按车辆分组明细
    #[serde(default)]
    pub items_layout: ItemsLayout, // 明细布局（入库归一化时判定）
}

impl FormData {
    /// 顺序拼接四处明细列表
    pub fn all_items(&self) -> impl Iterator<Item = &ItemRow> {
        self.productos
            .iter()
            .chain(self.items.iter())
            .chain(self.destinos.iter().flat_map(|d| d.items.iter()))
            .chain(self.placas.iter().flat_map(|p| p.items.iter()))
    }

    /// 是否存在任何明细行
    pub fn has_items(&self) -> bool {
        self.all_items().next().is_some()
    }

    /// 入库归一化: 判定并固化明细布局
    ///
    /// # 规则
    /// - 任一明细行 numero_paleta == 0 → 汇总布局
    /// - 否则 → 明细布局
    /// - 无明细行 → 汇总布局（空单无歧义）
    pub fn resolve_items_layout(&mut self) {
        let mut any_row = false;
        let mut any_summary_sentinel = false;
        for item in self.all_items() {
            any_row = true;
            if item.numero_paleta == Some(SUMMARY_PALLET_SENTINEL) {
                any_summary_sentinel = true;
                break;
            }
        }
        self.items_layout = if !any_row || any_summary_sentinel {
            ItemsLayout::Summary
        } else {
            ItemsLayout::Detail
        };
    }
}

// ==========================================
// FormOperation - 仓库表单作业
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormOperation {
    // ===== 标识 =====
    pub id: String,        // 表单唯一标识
    pub client: String,    // 客户编码
    pub fecha: DateTime<Utc>, // 作业时间（UTC, 展示与分班按本地 UTC-5）
    pub form_kind: FormKind, // 表单类型（重量模式 x 方向）

    // ===== 订单与运输 =====
    #[serde(default)]
    pub tipo_pedido: Option<String>, // 订单类型（隧道冻结等专项按此识别）
    #[serde(default)]
    pub pedido_sislog: Option<String>, // SISLOG 订单号
    #[serde(default)]
    pub placa: Option<String>, // 车牌号
    #[serde(default)]
    pub contenedor: Option<String>, // 集装箱号
    #[serde(default)]
    pub tipo_vehiculo: Option<String>, // 车型

    // ===== 作业时段（"HH:mm" 文本）=====
    #[serde(default)]
    pub hora_inicio: Option<String>, // 作业开始
    #[serde(default)]
    pub hora_fin: Option<String>, // 作业结束

    // ===== 附注 =====
    #[serde(default)]
    pub observaciones: Vec<ObservacionRegistro>, // 观察项登记

    // ===== 载荷 =====
    pub form_data: FormData, // 明细载荷
}

// ==========================================
// RoleCount - 装卸队角色人数
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleCount {
    pub rol: String, // 角色名称（SUPERVISOR/MONTACARGUISTA/...）
    #[serde(default)]
    pub numero_personas: u32, // 到场人数
}

// ==========================================
// AppliedTariff - 手工作业引用的费率
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedTariff {
    pub tariff_id: String, // 概念专项费率目录编号
    #[serde(default)]
    pub cantidad: Option<f64>, // 录入数量
}

// ==========================================
// ManualDetails - 手工作业明细
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManualDetails {
    #[serde(default)]
    pub hora_inicio: Option<String>, // 开始时刻 "HH:mm"
    #[serde(default)]
    pub hora_fin: Option<String>, // 结束时刻 "HH:mm"
    #[serde(default)]
    pub personal: Vec<RoleCount>, // 到场角色人数（临时装卸队）
    #[serde(default)]
    pub placa: Option<String>, // 车牌号
    #[serde(default)]
    pub contenedor: Option<String>, // 集装箱号
    #[serde(default)]
    pub observacion: Option<String>, // 备注
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>, // 其余录入字段原样保留
}

// ==========================================
// ManualOperation - 手工登记作业
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualOperation {
    pub id: String,           // 登记唯一标识
    pub client: String,       // 客户编码
    pub concepto: String,     // 目标概念名称（精确匹配）
    pub fecha: DateTime<Utc>, // 登记作业时间
    #[serde(default)]
    pub specific_tariffs: Vec<AppliedTariff>, // 引用的专项费率与数量
    #[serde(default)]
    pub detalles: ManualDetails, // 录入明细
}

// ==========================================
// OperationRecord - 作业记录联合
// ==========================================
// 入库时按 tipo_registro 判别一次, 引擎各策略按需下钻
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "tipo_registro", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationRecord {
    Formulario(FormOperation),       // 仓库表单
    ManualCliente(ManualOperation),  // 手工客户作业
    ManualCuadrilla(ManualOperation), // 手工装卸队作业
}

impl OperationRecord {
    /// 记录的作业时间
    pub fn fecha(&self) -> DateTime<Utc> {
        match self {
            OperationRecord::Formulario(f) => f.fecha,
            OperationRecord::ManualCliente(m) | OperationRecord::ManualCuadrilla(m) => m.fecha,
        }
    }

    /// 记录归属客户
    pub fn client(&self) -> &str {
        match self {
            OperationRecord::Formulario(f) => &f.client,
            OperationRecord::ManualCliente(m) | OperationRecord::ManualCuadrilla(m) => &m.client,
        }
    }

    /// 表单记录视图
    pub fn as_form(&self) -> Option<&FormOperation> {
        match self {
            OperationRecord::Formulario(f) => Some(f),
            _ => None,
        }
    }

    /// 手工记录视图（客户或装卸队）
    pub fn as_manual(&self) -> Option<&ManualOperation> {
        match self {
            OperationRecord::ManualCliente(m) | OperationRecord::ManualCuadrilla(m) => Some(m),
            _ => None,
        }
    }

    /// 是否手工装卸队记录
    pub fn is_manual_crew(&self) -> bool {
        matches!(self, OperationRecord::ManualCuadrilla(_))
    }

    /// 入库归一化: 固化表单明细布局
    pub fn normalize(&mut self) {
        if let OperationRecord::Formulario(f) = self {
            f.form_data.resolve_items_layout();
        }
    }
}
