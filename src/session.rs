use alloy_primitives::{Address, U256};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::aggregator::{AddrInfo, AddrInfoService};
use crate::contract::{NftContract, TxReceipt};
use crate::error::{GatewayError, SessionError};
use crate::gateway::{ChainGateway, ListQuery, Transaction, TransferEvent};
use crate::ownership::reconstruct;

pub const DEFAULT_TRANSACTION_LIMIT: u32 = 10;

/// Everything the dashboard shows for the connected account.
///
/// Sections load independently: a failed section is left empty and its
/// error lands in `notices`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardView {
    pub account: Option<Address>,
    pub addr_info: Option<AddrInfo>,
    pub transactions: Vec<Transaction>,
    pub owned_tokens: Vec<TransferEvent>,
    pub notices: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MintOutcome {
    /// `nextTokenId` as read just before minting.
    pub token_id: U256,
    pub receipt: TxReceipt,
    pub view: DashboardView,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransferOutcome {
    pub token_id: U256,
    pub recipient: Address,
    pub receipt: TxReceipt,
    pub view: DashboardView,
}

/// The connected account plus the actions it can take.
pub struct WalletSession {
    gateway: Arc<dyn ChainGateway>,
    addr_info: Arc<AddrInfoService>,
    contract: Arc<dyn NftContract>,
    nft_contract_address: Address,
    transaction_limit: u32,
    account: Option<Address>,
}

impl WalletSession {
    pub fn new(
        gateway: Arc<dyn ChainGateway>,
        addr_info: Arc<AddrInfoService>,
        contract: Arc<dyn NftContract>,
        nft_contract_address: Address,
    ) -> Self {
        Self {
            gateway,
            addr_info,
            contract,
            nft_contract_address,
            transaction_limit: DEFAULT_TRANSACTION_LIMIT,
            account: None,
        }
    }

    pub fn with_transaction_limit(mut self, limit: u32) -> Self {
        self.transaction_limit = limit;
        self
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub async fn connect(&mut self, account: Address) -> DashboardView {
        info!("Wallet connected: {:?}", account);
        self.account = Some(account);
        self.refresh().await
    }

    pub fn disconnect(&mut self) {
        if let Some(account) = self.account.take() {
            info!("Wallet disconnected: {:?}", account);
        }
    }

    /// Reload all three sections concurrently. Empty view when disconnected.
    pub async fn refresh(&self) -> DashboardView {
        let Some(account) = self.account else {
            return DashboardView::default();
        };

        let (addr_info, transactions, owned) = tokio::join!(
            self.addr_info.get_addr_info(account),
            self.gateway
                .list_transactions(account, ListQuery::latest(self.transaction_limit)),
            self.owned_tokens(account),
        );

        let mut view = DashboardView {
            account: Some(account),
            ..DashboardView::default()
        };

        match addr_info {
            Ok(info) => view.addr_info = Some(info),
            Err(e) => view.notices.push(format!("Failed to fetch address info: {e}")),
        }

        match transactions {
            Ok(listing) => {
                view.transactions = listing.items;
                view.notices.extend(listing.notice);
            }
            Err(e) => view.notices.push(format!("Failed to get transactions: {e}")),
        }

        match owned {
            Ok((tokens, notice)) => {
                view.owned_tokens = tokens;
                view.notices.extend(notice);
            }
            Err(e) => view.notices.push(format!("Failed to fetch minted NFTs: {e}")),
        }

        for notice in &view.notices {
            warn!("Dashboard for {:?}: {}", account, notice);
        }

        view
    }

    pub async fn owned_tokens(
        &self,
        account: Address,
    ) -> Result<(Vec<TransferEvent>, Option<String>), GatewayError> {
        fetch_owned_tokens(self.gateway.as_ref(), account, self.nft_contract_address).await
    }

    pub async fn mint(&self) -> Result<MintOutcome, SessionError> {
        let account = self.account.ok_or(SessionError::NotConnected)?;

        let token_id = self.contract.next_token_id().await?;
        let receipt = self.contract.mint().await?;
        info!(
            "Minted token {} to {:?} in {}",
            token_id, account, receipt.transaction_hash
        );

        Ok(MintOutcome {
            token_id,
            receipt,
            view: self.refresh().await,
        })
    }

    /// Transfer a token held by the connected account to `recipient`.
    pub async fn transfer(
        &self,
        token_id: &str,
        recipient: &str,
    ) -> Result<TransferOutcome, SessionError> {
        let account = self.account.ok_or(SessionError::NotConnected)?;

        let token_id = parse_token_id(token_id)?;
        let recipient = Address::from_str(recipient.trim())
            .map_err(|_| SessionError::InvalidRecipient(recipient.to_string()))?;

        let owner = self.contract.owner_of(token_id).await?;
        if owner != account {
            return Err(SessionError::NotOwner {
                token_id: token_id.to_string(),
                owner,
            });
        }

        let receipt = self
            .contract
            .safe_transfer_from(account, recipient, token_id)
            .await?;
        info!(
            "Transferred token {} from {:?} to {:?} in {}",
            token_id, account, recipient, receipt.transaction_hash
        );

        Ok(TransferOutcome {
            token_id,
            recipient,
            receipt,
            view: self.refresh().await,
        })
    }
}

/// Tokens of `nft_contract_address` currently held by `account`, with the
/// explorer's notice when the transfer listing came back empty.
pub async fn fetch_owned_tokens(
    gateway: &dyn ChainGateway,
    account: Address,
    nft_contract_address: Address,
) -> Result<(Vec<TransferEvent>, Option<String>), GatewayError> {
    let listing = gateway
        .list_token_transfers(account, nft_contract_address, ListQuery::ascending())
        .await?;
    let owned = reconstruct(&listing.items, account);
    Ok((owned.into_events(), listing.notice))
}

fn parse_token_id(token_id: &str) -> Result<U256, SessionError> {
    let trimmed = token_id.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(SessionError::InvalidTokenId(token_id.to_string()));
    }
    U256::from_str_radix(trimmed, 10).map_err(|_| SessionError::InvalidTokenId(token_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContractError;
    use crate::testing::{ContractCall, StubContract, StubGateway};
    use alloy_primitives::address;

    const ME: Address = address!("00000000000000000000000000000000000000aa");
    const FRIEND: Address = address!("00000000000000000000000000000000000000bb");
    const NFT: Address = address!("3263925cb57481af41e397e875e51b58897f953e");

    fn transfer(token_id: &str, from: Address, to: Address, block_number: u64) -> TransferEvent {
        TransferEvent {
            token_id: token_id.to_string(),
            from,
            to,
            contract_address: NFT,
            block_number,
            transaction_index: 0,
            hash: format!("0x{block_number:064x}"),
            timestamp: 0,
            token_name: "DashboardNFT".to_string(),
            token_symbol: "DNFT".to_string(),
        }
    }

    fn session(gateway: StubGateway, contract: Arc<StubContract>) -> (WalletSession, Arc<StubGateway>) {
        let gateway = Arc::new(gateway);
        let service = Arc::new(AddrInfoService::new(gateway.clone()));
        let session = WalletSession::new(gateway.clone(), service, contract, NFT);
        (session, gateway)
    }

    #[tokio::test]
    async fn connect_loads_every_section() {
        let gateway = StubGateway::healthy().with_transfers(vec![
            transfer("1", Address::ZERO, ME, 1),
            transfer("1", ME, FRIEND, 2),
            transfer("2", Address::ZERO, ME, 3),
        ]);
        let (mut session, gateway) = session(gateway, Arc::new(StubContract::new(ME)));

        let view = session.connect(ME).await;

        assert_eq!(view.account, Some(ME));
        assert_eq!(view.addr_info.unwrap().block.block_number, 16);
        let owned: Vec<&str> = view.owned_tokens.iter().map(|t| t.token_id.as_str()).collect();
        assert_eq!(owned, vec!["2"]);
        // the empty transaction history surfaces as a notice
        assert_eq!(view.notices, vec!["No transactions found".to_string()]);

        let queries = gateway.recorded_queries();
        assert!(queries.contains(&ListQuery::latest(DEFAULT_TRANSACTION_LIMIT)));
        assert!(queries.contains(&ListQuery::ascending()));
    }

    #[tokio::test]
    async fn failed_section_does_not_hide_the_others() {
        let gateway = StubGateway {
            gas_price: Err(GatewayError::Transport("timeout".into())),
            ..StubGateway::healthy()
        }
        .with_transfers(vec![transfer("5", Address::ZERO, ME, 1)]);
        let (mut session, _) = session(gateway, Arc::new(StubContract::new(ME)));

        let view = session.connect(ME).await;

        assert!(view.addr_info.is_none());
        assert_eq!(view.owned_tokens.len(), 1);
        assert!(view.notices.iter().any(|n| n.starts_with("Failed to fetch address info")));
    }

    #[tokio::test]
    async fn recent_transactions_use_the_configured_limit() {
        let tx = Transaction {
            hash: format!("0x{:064x}", 9),
            block_number: 9,
            timestamp: 1_700_000_000,
            from: FRIEND,
            to: Some(ME),
            value_wei: U256::from(5u64),
            is_error: false,
        };
        let gateway = StubGateway::healthy().with_transactions(vec![tx.clone()]);
        let (mut session, gateway) = session(gateway, Arc::new(StubContract::new(ME)));
        session = session.with_transaction_limit(3);

        let view = session.connect(ME).await;

        assert_eq!(view.transactions, vec![tx]);
        assert!(gateway.recorded_queries().contains(&ListQuery::latest(3)));
    }

    #[tokio::test]
    async fn disconnected_session_cannot_act() {
        let (mut session, _) = session(StubGateway::healthy(), Arc::new(StubContract::new(ME)));
        session.connect(ME).await;
        session.disconnect();

        assert_eq!(session.account(), None);
        assert_eq!(session.refresh().await, DashboardView::default());
        assert_eq!(session.mint().await.unwrap_err(), SessionError::NotConnected);
        assert_eq!(
            session.transfer("1", "0x00000000000000000000000000000000000000bb").await.unwrap_err(),
            SessionError::NotConnected
        );
    }

    #[tokio::test]
    async fn mint_reports_token_id_read_before_minting() {
        let contract = Arc::new(StubContract::new(ME));
        let (mut session, _) = session(StubGateway::healthy(), contract.clone());
        session.connect(ME).await;

        let first = session.mint().await.unwrap();
        let second = session.mint().await.unwrap();

        assert_eq!(first.token_id, U256::ZERO);
        assert_eq!(second.token_id, U256::from(1));
        assert_eq!(first.view.account, Some(ME));
        assert_eq!(
            contract.calls(),
            vec![
                ContractCall::NextTokenId,
                ContractCall::Mint,
                ContractCall::NextTokenId,
                ContractCall::Mint
            ]
        );
    }

    #[tokio::test]
    async fn rejected_mint_is_surfaced() {
        let mut contract = StubContract::new(ME);
        contract.reject_writes = true;
        let (mut session, _) = session(StubGateway::healthy(), Arc::new(contract));
        session.connect(ME).await;

        let err = session.mint().await.unwrap_err();
        assert!(matches!(err, SessionError::Contract(ContractError::Rejected(_))));
    }

    #[tokio::test]
    async fn transfer_sends_from_connected_account() {
        let contract = Arc::new(StubContract::new(ME).with_owner(7, ME));
        let (mut session, _) = session(StubGateway::healthy(), contract.clone());
        session.connect(ME).await;

        let outcome = session
            .transfer("7", "0x00000000000000000000000000000000000000BB")
            .await
            .unwrap();

        assert_eq!(outcome.recipient, FRIEND);
        assert_eq!(
            contract.calls(),
            vec![
                ContractCall::OwnerOf(U256::from(7)),
                ContractCall::SafeTransferFrom(ME, FRIEND, U256::from(7))
            ]
        );
    }

    #[tokio::test]
    async fn transfer_validates_before_calling_the_contract() {
        let contract = Arc::new(StubContract::new(ME).with_owner(7, FRIEND));
        let (mut session, _) = session(StubGateway::healthy(), contract.clone());
        session.connect(ME).await;

        assert!(matches!(
            session.transfer("seven", "0x00000000000000000000000000000000000000bb").await,
            Err(SessionError::InvalidTokenId(_))
        ));
        assert!(matches!(
            session.transfer("7", "").await,
            Err(SessionError::InvalidRecipient(_))
        ));
        assert!(contract.calls().is_empty());

        let err = session
            .transfer("7", "0x00000000000000000000000000000000000000cc")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SessionError::NotOwner {
                token_id: "7".to_string(),
                owner: FRIEND
            }
        );
        assert_eq!(contract.calls(), vec![ContractCall::OwnerOf(U256::from(7))]);
    }
}
