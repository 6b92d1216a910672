pub mod common;
pub mod constants;
pub mod jupiter;
pub mod trading;
pub mod utils;

use std::sync::Arc;

use log::info;
use solana_sdk::{pubkey::Pubkey, signature::Signature};

use crate::common::endpoint::{ConnectionFactory, EndpointSelector, RpcConnectionFactory};
use crate::common::error::SwapPayError;
use crate::common::types::{AnyResult, SwapPayConfig};
use crate::jupiter::{JupiterApiClient, QuoteRequest, SwapExecutionPrefs, SwapMode};
use crate::trading::submitter::TransactionSubmitter;
use crate::trading::wallet::WalletAdapter;
use crate::utils::calc::input_units_for_target;
use crate::utils::token::derive_associated_token_account;

pub use crate::common::types::SolanaRpcClient;
pub use crate::trading::wallet::KeypairWallet;

/// Terminal settlement state of a completed payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementStatus {
    Success,
}

impl SettlementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettlementStatus::Success => "success",
        }
    }
}

impl std::fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a completed swap-and-pay operation.
#[derive(Debug, Clone)]
pub struct SwapPayReceipt {
    /// Network signature of the settled transaction
    pub signature: Signature,
    pub status: SettlementStatus,
}

/// Parameters for [`SwapPayClient::swap_and_pay`].
#[derive(Clone)]
pub struct SwapAndPayParams<C> {
    /// Optional pre-existing connection; probed and replaced when dead
    pub connection: Option<Arc<C>>,
    /// Token the buyer pays with
    pub input_mint: Pubkey,
    /// Input amount in smallest units (exact-in semantics)
    pub amount: u64,
    /// Recipient wallet; settlement lands in its associated token account
    pub recipient: Pubkey,
    /// Slippage tolerance override in basis points
    pub slippage_bps: Option<u16>,
    /// Execution preferences forwarded to the swap builder
    pub prefs: SwapExecutionPrefs,
}

impl<C> SwapAndPayParams<C> {
    pub fn new(input_mint: Pubkey, amount: u64, recipient: Pubkey) -> Self {
        Self {
            connection: None,
            input_mint,
            amount,
            recipient,
            slippage_bps: None,
            prefs: SwapExecutionPrefs::default(),
        }
    }

    pub fn with_connection(mut self, connection: Arc<C>) -> Self {
        self.connection = Some(connection);
        self
    }

    pub fn with_slippage_bps(mut self, slippage_bps: u16) -> Self {
        self.slippage_bps = Some(slippage_bps);
        self
    }
}

/// Parameters for [`SwapPayClient::pay_fixed_price`].
#[derive(Clone)]
pub struct FixedPricePayment<C> {
    /// Optional pre-existing connection
    pub connection: Option<Arc<C>>,
    /// Token the buyer pays with
    pub input_mint: Pubkey,
    /// Target price in settlement display units (e.g. 25.00 USDC)
    pub target_price: f64,
    /// Recipient wallet
    pub recipient: Pubkey,
    /// Input token decimals; resolved from the verified token registry
    /// when absent
    pub input_decimals: Option<u8>,
    /// Slippage tolerance override in basis points
    pub slippage_bps: Option<u16>,
    /// Execution preferences forwarded to the swap builder
    pub prefs: SwapExecutionPrefs,
}

impl<C> FixedPricePayment<C> {
    pub fn new(input_mint: Pubkey, target_price: f64, recipient: Pubkey) -> Self {
        Self {
            connection: None,
            input_mint,
            target_price,
            recipient,
            input_decimals: None,
            slippage_bps: None,
            prefs: SwapExecutionPrefs::default(),
        }
    }

    pub fn with_input_decimals(mut self, decimals: u8) -> Self {
        self.input_decimals = Some(decimals);
        self
    }

    pub fn with_connection(mut self, connection: Arc<C>) -> Self {
        self.connection = Some(connection);
        self
    }
}

/// Client for swap-and-pay checkout flows.
///
/// Sequences endpoint selection, quoting, swap construction and submission
/// into single operations. Invocations are independent: each gets its own
/// connection and quote, so one client can serve concurrent purchases.
pub struct SwapPayClient<F: ConnectionFactory = RpcConnectionFactory> {
    pub config: SwapPayConfig,
    /// Aggregator REST client
    pub jupiter: JupiterApiClient,
    selector: EndpointSelector<F>,
    wallet: Arc<dyn WalletAdapter>,
}

impl SwapPayClient<RpcConnectionFactory> {
    /// Create a client backed by real RPC connections.
    pub fn new(wallet: Arc<dyn WalletAdapter>, config: SwapPayConfig) -> AnyResult<Self> {
        let factory = RpcConnectionFactory { commitment: config.commitment };
        Self::with_factory(wallet, config, factory)
    }
}

impl<F: ConnectionFactory> SwapPayClient<F> {
    /// Create a client with a custom connection factory (tests inject mock
    /// connections through this).
    pub fn with_factory(
        wallet: Arc<dyn WalletAdapter>,
        config: SwapPayConfig,
        factory: F,
    ) -> AnyResult<Self> {
        let jupiter = JupiterApiClient::new(config.jupiter.clone())?;
        let selector = EndpointSelector::new(config.rpc_endpoints.clone(), factory);
        Ok(Self { config, jupiter, selector, wallet })
    }

    pub fn wallet(&self) -> &dyn WalletAdapter {
        self.wallet.as_ref()
    }

    pub fn selector(&self) -> &EndpointSelector<F> {
        &self.selector
    }

    /// Swap `amount` of the input token into the settlement currency and
    /// deliver it to the recipient's associated token account.
    ///
    /// Exactly one swap transaction is built and submitted per call; on any
    /// failure the caller retries from a fresh quote rather than
    /// resubmitting.
    pub async fn swap_and_pay(
        &self,
        params: SwapAndPayParams<F::Conn>,
    ) -> Result<SwapPayReceipt, SwapPayError> {
        let connection = self.selector.ensure(params.connection.clone()).await?;

        info!(
            "starting swap and pay: input mint {}, amount {}, recipient {}",
            params.input_mint, params.amount, params.recipient
        );

        let recipient_token_account =
            derive_associated_token_account(&params.recipient, &self.config.settlement_mint);

        let quote = self
            .jupiter
            .get_quote(&QuoteRequest {
                input_mint: params.input_mint,
                output_mint: self.config.settlement_mint,
                amount: params.amount,
                slippage_bps: params.slippage_bps.unwrap_or(self.config.slippage_bps),
                swap_mode: SwapMode::ExactIn,
                restrict_intermediate_tokens: true,
            })
            .await?;
        info!("quote received: out amount {}", quote.out_amount);

        let payload = self
            .jupiter
            .build_swap_transaction(
                &quote,
                &self.wallet.pubkey(),
                &recipient_token_account,
                &params.prefs,
            )
            .await?;
        info!("swap transaction received");

        let mut submitter = TransactionSubmitter::new(&self.selector, connection);
        let signature = submitter.submit(&payload, self.wallet.as_ref()).await?;

        Ok(SwapPayReceipt { signature, status: SettlementStatus::Success })
    }

    /// Charge a fixed settlement-currency price in an arbitrary input token.
    ///
    /// Fetches unit prices for the input and settlement mints in one batched
    /// call, converts the target price into input base units, then runs
    /// [`swap_and_pay`](Self::swap_and_pay). Unusable price data aborts
    /// before any quote is requested.
    pub async fn pay_fixed_price(
        &self,
        params: FixedPricePayment<F::Conn>,
    ) -> Result<SwapPayReceipt, SwapPayError> {
        let prices = self
            .jupiter
            .get_prices(&[params.input_mint, self.config.settlement_mint])
            .await?;

        let input_price = prices.price_of(&params.input_mint);
        let output_price = prices.price_of(&self.config.settlement_mint);

        let input_decimals = match params.input_decimals {
            Some(decimals) => decimals,
            None => self.registry_decimals(&params.input_mint).await?,
        };

        let amount = match (input_price, output_price) {
            (Some(input_price), Some(output_price)) => input_units_for_target(
                input_price,
                output_price,
                params.target_price,
                input_decimals,
            ),
            _ => None,
        }
        .ok_or_else(|| {
            SwapPayError::InvalidAmount(format!(
                "cannot derive input amount for {} from price data",
                params.input_mint
            ))
        })?;

        let mut swap_params = SwapAndPayParams::new(params.input_mint, amount, params.recipient);
        swap_params.connection = params.connection;
        swap_params.slippage_bps = params.slippage_bps;
        swap_params.prefs = params.prefs;

        self.swap_and_pay(swap_params).await
    }

    /// Look up a mint's decimals in the verified token registry.
    async fn registry_decimals(&self, mint: &Pubkey) -> Result<u8, SwapPayError> {
        let tokens = self.jupiter.get_verified_tokens().await.map_err(|e| {
            SwapPayError::InvalidAmount(format!("input token decimals unknown: {e}"))
        })?;
        let mint_str = mint.to_string();
        tokens
            .iter()
            .find(|token| token.address == mint_str)
            .map(|token| token.decimals)
            .ok_or_else(|| {
                SwapPayError::InvalidAmount(format!(
                    "input token {mint_str} is not in the verified registry"
                ))
            })
    }
}
