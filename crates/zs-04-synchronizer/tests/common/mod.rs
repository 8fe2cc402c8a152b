//! Scripted contract double shared by the synchronizer integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use primitive_types::{H160, H256, U256};
use zs_01_contract_reader::{AbiType, AbiValue, ContractError, ContractReader, ZaryaContract};
use zs_02_organ_decoder::{DecoderConfig, OrganDecoder};
use zs_03_cell_store::{
    CategoricalCell, CellStore, InMemoryCellStore, NumericalCell, Organ, OrganId, Statement,
    StoreError, Theme,
};
use zs_04_synchronizer::{SyncConfig, Synchronizer};

#[derive(Clone)]
pub struct NumericalScript {
    pub organ: H256,
    pub decimals: u8,
    pub values: Vec<u64>,
}

#[derive(Clone)]
pub struct CategoricalScript {
    pub organ: H256,
    pub allowed: Vec<u64>,
    pub history: Vec<u64>,
}

#[derive(Default)]
pub struct ChainState {
    pub themes: HashMap<(bool, u64), String>,
    pub statements: HashMap<(bool, u64), String>,
    pub numerical: HashMap<(u64, u64), NumericalScript>,
    pub categorical: HashMap<(u64, u64), CategoricalScript>,
    pub category_names: HashMap<(u64, u64, u64), String>,
    /// Functions that answer with an RPC error.
    pub failing: HashSet<String>,
}

/// In-memory stand-in for the Zarya contract.
#[derive(Default)]
pub struct ScriptedChain {
    pub state: Mutex<ChainState>,
    pub calls: AtomicUsize,
}

impl ScriptedChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn theme(&self, categorical: bool, x: u64, text: &str) {
        self.state.lock().themes.insert((categorical, x), text.into());
    }

    pub fn statement(&self, categorical: bool, y: u64, text: &str) {
        self.state.lock().statements.insert((categorical, y), text.into());
    }

    pub fn numerical(&self, x: u64, y: u64, organ: H256, decimals: u8, values: &[u64]) {
        self.state.lock().numerical.insert(
            (x, y),
            NumericalScript {
                organ,
                decimals,
                values: values.to_vec(),
            },
        );
    }

    pub fn categorical(&self, x: u64, y: u64, organ: H256, allowed: &[u64], history: &[u64]) {
        self.state.lock().categorical.insert(
            (x, y),
            CategoricalScript {
                organ,
                allowed: allowed.to_vec(),
                history: history.to_vec(),
            },
        );
    }

    pub fn category_name(&self, x: u64, y: u64, id: u64, name: &str) {
        self.state.lock().category_names.insert((x, y, id), name.into());
    }

    pub fn fail(&self, function: &str) {
        self.state.lock().failing.insert(function.into());
    }

    pub fn heal(&self, function: &str) {
        self.state.lock().failing.remove(function);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn arg_u64(inputs: &[AbiValue], i: usize) -> u64 {
    inputs.get(i).and_then(AbiValue::as_u64).unwrap_or_default()
}

fn uints(bits: usize, values: impl IntoIterator<Item = u64>) -> AbiValue {
    AbiValue::Array(
        AbiType::Uint(bits),
        values
            .into_iter()
            .map(|v| AbiValue::Uint(U256::from(v), bits))
            .collect(),
    )
}

fn history(values: &[u64]) -> Vec<AbiValue> {
    vec![
        uints(32, (0..values.len() as u64).map(|i| 1_700_000_000 + i)),
        AbiValue::Array(
            AbiType::Address,
            values.iter().map(|_| AbiValue::Address(H160::repeat_byte(0xaa))).collect(),
        ),
        uints(64, values.iter().copied()),
    ]
}

fn window(values: &[u64], inputs: &[AbiValue]) -> Vec<u64> {
    let from = arg_u64(inputs, 2) as usize;
    let count = arg_u64(inputs, 3) as usize;
    values.iter().skip(from).take(count).copied().collect()
}

#[async_trait]
impl ContractReader for ScriptedChain {
    async fn call(
        &self,
        function: &str,
        inputs: &[AbiValue],
        _outputs: &[AbiType],
    ) -> Result<Vec<AbiValue>, ContractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // behave like a network call: suspend once before answering
        tokio::task::yield_now().await;
        let state = self.state.lock();

        if state.failing.contains(function) {
            return Err(ContractError::Rpc {
                code: -32000,
                message: format!("{} reverted", function),
            });
        }

        let flag = inputs.first().and_then(AbiValue::as_bool).unwrap_or(false);
        let (x, y) = (arg_u64(inputs, 0), arg_u64(inputs, 1));

        let reply = match function {
            "getTheme" => {
                let text = state.themes.get(&(flag, arg_u64(inputs, 1))).cloned();
                vec![AbiValue::String(text.unwrap_or_default())]
            }
            "getStatement" => {
                let text = state.statements.get(&(flag, arg_u64(inputs, 1))).cloned();
                vec![AbiValue::String(text.unwrap_or_default())]
            }
            "getNumericalCellInfo" => match state.numerical.get(&(x, y)) {
                Some(cell) => vec![
                    AbiValue::Bytes32(cell.organ),
                    AbiValue::Uint(U256::from(cell.decimals), 8),
                    AbiValue::uint256(cell.values.len() as u64),
                ],
                None => vec![
                    AbiValue::Bytes32(H256::zero()),
                    AbiValue::Uint(U256::zero(), 8),
                    AbiValue::uint256(0u64),
                ],
            },
            "getNumericalHistory" => {
                let values = state.numerical.get(&(x, y)).map(|c| c.values.clone()).unwrap_or_default();
                history(&window(&values, inputs))
            }
            "getCategoricalCellInfo" => match state.categorical.get(&(x, y)) {
                Some(cell) => vec![
                    AbiValue::Bytes32(cell.organ),
                    uints(64, cell.allowed.iter().copied()),
                    AbiValue::uint256(cell.history.len() as u64),
                ],
                None => vec![
                    AbiValue::Bytes32(H256::zero()),
                    uints(64, std::iter::empty()),
                    AbiValue::uint256(0u64),
                ],
            },
            "getCategoricalHistory" => {
                let values = state.categorical.get(&(x, y)).map(|c| c.history.clone()).unwrap_or_default();
                history(&window(&values, inputs))
            }
            "getCategoryName" => {
                let id = arg_u64(inputs, 2);
                match state.category_names.get(&(x, y, id)) {
                    Some(name) => vec![AbiValue::String(name.clone())],
                    None => {
                        return Err(ContractError::Rpc {
                            code: -32000,
                            message: format!("unknown category {}", id),
                        })
                    }
                }
            }
            other => {
                return Err(ContractError::Rpc {
                    code: -32601,
                    message: format!("unknown function {}", other),
                })
            }
        };

        Ok(reply)
    }
}

pub fn decoder() -> Arc<OrganDecoder> {
    Arc::new(OrganDecoder::build(&DecoderConfig { scan_organ_size: 5 }).unwrap())
}

pub fn synchronizer(
    chain: Arc<ScriptedChain>,
    store: Arc<dyn CellStore>,
    config: SyncConfig,
) -> Synchronizer {
    Synchronizer::new(ZaryaContract::new(chain), store, decoder(), config)
}

pub fn small_config() -> SyncConfig {
    SyncConfig {
        max_scan_size: 4,
        ..Default::default()
    }
}

/// In-memory store whose cell writes fail, as on a full disk.
#[derive(Default)]
pub struct FailingCellWrites {
    pub inner: InMemoryCellStore,
}

impl CellStore for FailingCellWrites {
    fn upsert_theme(&self, theme: Theme) -> Result<(), StoreError> {
        self.inner.upsert_theme(theme)
    }

    fn upsert_statement(&self, statement: Statement) -> Result<(), StoreError> {
        self.inner.upsert_statement(statement)
    }

    fn upsert_numerical_cell(&self, _: NumericalCell) -> Result<(), StoreError> {
        Err(StoreError::Serialization("disk full".into()))
    }

    fn upsert_categorical_cell(&self, _: CategoricalCell) -> Result<(), StoreError> {
        Err(StoreError::Serialization("disk full".into()))
    }

    fn organ(&self, id: OrganId) -> Result<Option<Organ>, StoreError> {
        self.inner.organ(id)
    }

    fn insert_organ_if_absent(&self, organ: Organ) -> Result<Organ, StoreError> {
        self.inner.insert_organ_if_absent(organ)
    }

    fn theme(&self, x_index: u64, is_categorical: bool) -> Result<Option<Theme>, StoreError> {
        self.inner.theme(x_index, is_categorical)
    }

    fn statement(&self, y_index: u64, is_categorical: bool) -> Result<Option<Statement>, StoreError> {
        self.inner.statement(y_index, is_categorical)
    }

    fn numerical_cell(&self, x_index: u64, y_index: u64) -> Result<Option<NumericalCell>, StoreError> {
        self.inner.numerical_cell(x_index, y_index)
    }

    fn categorical_cell(&self, x_index: u64, y_index: u64) -> Result<Option<CategoricalCell>, StoreError> {
        self.inner.categorical_cell(x_index, y_index)
    }

    fn themes(&self) -> Result<Vec<Theme>, StoreError> {
        self.inner.themes()
    }

    fn statements(&self) -> Result<Vec<Statement>, StoreError> {
        self.inner.statements()
    }

    fn organs(&self) -> Result<Vec<Organ>, StoreError> {
        self.inner.organs()
    }

    fn numerical_cells(&self) -> Result<Vec<NumericalCell>, StoreError> {
        self.inner.numerical_cells()
    }

    fn categorical_cells(&self) -> Result<Vec<CategoricalCell>, StoreError> {
        self.inner.categorical_cells()
    }
}
