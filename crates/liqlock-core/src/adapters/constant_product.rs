//! In-process constant-product pool exposing the router call contract.
//!
//! The first deposit mints `isqrt(token * native)` liquidity; later deposits
//! are matched to the pool ratio and mint proportionally to the smaller side.

use integer_sqrt::IntegerSquareRoot;
use solana_program::pubkey::Pubkey;
use tracing::debug;

use crate::error::RouterError;
use crate::interfaces::{AddLiquidityReceipt, AddLiquidityRequest, AmmRouter, FungibleToken};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantProductRouter {
    address: Pubkey,
    token_reserve: u64,
    native_reserve: u64,
    total_liquidity: u64,
}

impl ConstantProductRouter {
    pub fn new(address: Pubkey) -> Self {
        Self {
            address,
            token_reserve: 0,
            native_reserve: 0,
            total_liquidity: 0,
        }
    }

    /// Start from an already-funded pool
    pub fn with_reserves(
        address: Pubkey,
        token_reserve: u64,
        native_reserve: u64,
        total_liquidity: u64,
    ) -> Self {
        Self {
            address,
            token_reserve,
            native_reserve,
            total_liquidity,
        }
    }

    pub fn reserves(&self) -> (u64, u64) {
        (self.token_reserve, self.native_reserve)
    }

    pub fn total_liquidity(&self) -> u64 {
        self.total_liquidity
    }

    fn quote(&self, request: &AddLiquidityRequest) -> Result<AddLiquidityReceipt, RouterError> {
        let desired = request.token_amount_desired as u128;
        let native = request.native_value as u128;

        if self.total_liquidity == 0 || self.token_reserve == 0 || self.native_reserve == 0 {
            let minted = (desired * native).integer_sqrt();
            return Ok(AddLiquidityReceipt {
                token_used: request.token_amount_desired,
                native_used: request.native_value,
                liquidity_minted: narrow(minted)?,
            });
        }

        let token_reserve = self.token_reserve as u128;
        let native_reserve = self.native_reserve as u128;
        let supply = self.total_liquidity as u128;

        let token_optimal = native * token_reserve / native_reserve;
        let (token_used, native_used) = if token_optimal <= desired {
            if token_optimal < request.token_amount_min as u128 {
                return Err(RouterError::BoundViolated(format!(
                    "token {} below minimum {}",
                    token_optimal, request.token_amount_min
                )));
            }
            (token_optimal, native)
        } else {
            let native_optimal = desired * native_reserve / token_reserve;
            if native_optimal < request.native_amount_min as u128 {
                return Err(RouterError::BoundViolated(format!(
                    "native {} below minimum {}",
                    native_optimal, request.native_amount_min
                )));
            }
            (desired, native_optimal)
        };

        let minted = (token_used * supply / token_reserve).min(native_used * supply / native_reserve);
        Ok(AddLiquidityReceipt {
            token_used: narrow(token_used)?,
            native_used: narrow(native_used)?,
            liquidity_minted: narrow(minted)?,
        })
    }
}

fn narrow(value: u128) -> Result<u64, RouterError> {
    u64::try_from(value).map_err(|_| RouterError::CallFailed("amount overflows u64".into()))
}

impl AmmRouter for ConstantProductRouter {
    fn address(&self) -> Pubkey {
        self.address
    }

    fn add_liquidity_with_native(
        &mut self,
        token: &mut dyn FungibleToken,
        request: &AddLiquidityRequest,
    ) -> Result<AddLiquidityReceipt, RouterError> {
        if request.router != self.address {
            return Err(RouterError::UnknownRouter {
                expected: self.address,
                requested: request.router,
            });
        }
        if request.now > request.deadline {
            return Err(RouterError::DeadlineExpired {
                deadline: request.deadline,
                now: request.now,
            });
        }
        if request.native_value < request.native_amount_min {
            return Err(RouterError::BoundViolated(format!(
                "native value {} below minimum {}",
                request.native_value, request.native_amount_min
            )));
        }

        let receipt = self.quote(request)?;
        if receipt.liquidity_minted == 0 {
            return Err(RouterError::BoundViolated("insufficient liquidity minted".into()));
        }

        let token_reserve = self
            .token_reserve
            .checked_add(receipt.token_used)
            .ok_or_else(|| RouterError::CallFailed("token reserve overflow".into()))?;
        let native_reserve = self
            .native_reserve
            .checked_add(receipt.native_used)
            .ok_or_else(|| RouterError::CallFailed("native reserve overflow".into()))?;
        let total_liquidity = self
            .total_liquidity
            .checked_add(receipt.liquidity_minted)
            .ok_or_else(|| RouterError::CallFailed("liquidity supply overflow".into()))?;

        token.transfer_from(&self.address, &request.payer, &self.address, receipt.token_used)?;

        self.token_reserve = token_reserve;
        self.native_reserve = native_reserve;
        self.total_liquidity = total_liquidity;

        debug!(
            token_used = receipt.token_used,
            native_used = receipt.native_used,
            liquidity_minted = receipt.liquidity_minted,
            "Constant-product pool minted liquidity"
        );
        Ok(receipt)
    }

    fn remove_liquidity_with_native(
        &mut self,
        token: &mut dyn FungibleToken,
        receipt: &AddLiquidityReceipt,
        recipient: &Pubkey,
    ) -> Result<(), RouterError> {
        let token_reserve = self
            .token_reserve
            .checked_sub(receipt.token_used)
            .ok_or(RouterError::UnknownPosition)?;
        let native_reserve = self
            .native_reserve
            .checked_sub(receipt.native_used)
            .ok_or(RouterError::UnknownPosition)?;
        let total_liquidity = self
            .total_liquidity
            .checked_sub(receipt.liquidity_minted)
            .ok_or(RouterError::UnknownPosition)?;

        token.transfer(&self.address, recipient, receipt.token_used)?;

        self.token_reserve = token_reserve;
        self.native_reserve = native_reserve;
        self.total_liquidity = total_liquidity;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::TokenLedger;

    fn request(router: Pubkey, payer: Pubkey, token: u64, native: u64) -> AddLiquidityRequest {
        AddLiquidityRequest {
            router,
            token: Pubkey::new_unique(),
            payer,
            token_amount_desired: token,
            token_amount_min: 0,
            native_amount_min: 0,
            native_value: native,
            recipient: payer,
            deadline: 100,
            now: 0,
        }
    }

    #[test]
    fn test_first_deposit_mints_geometric_mean() {
        let router_key = Pubkey::new_unique();
        let payer = Pubkey::new_unique();
        let mut router = ConstantProductRouter::new(router_key);
        let mut token = TokenLedger::new(Pubkey::new_unique());
        token.mint_to(&payer, 1_000_000).unwrap();
        token.approve(&payer, &router_key, 1_000_000).unwrap();

        let receipt = router
            .add_liquidity_with_native(&mut token, &request(router_key, payer, 40_000, 10_000))
            .unwrap();
        assert_eq!(receipt.liquidity_minted, 20_000);
        assert_eq!(receipt.token_used, 40_000);
        assert_eq!(router.reserves(), (40_000, 10_000));
        assert_eq!(token.balance_of(&router_key), 40_000);
    }

    #[test]
    fn test_follow_up_deposit_matches_pool_ratio() {
        let router_key = Pubkey::new_unique();
        let payer = Pubkey::new_unique();
        let mut router = ConstantProductRouter::with_reserves(router_key, 40_000, 10_000, 20_000);
        let mut token = TokenLedger::new(Pubkey::new_unique());
        token.mint_to(&payer, 1_000_000).unwrap();
        token.approve(&payer, &router_key, 1_000_000).unwrap();

        // 5_000 native only needs 20_000 token at a 4:1 ratio
        let receipt = router
            .add_liquidity_with_native(&mut token, &request(router_key, payer, 30_000, 5_000))
            .unwrap();
        assert_eq!(receipt.token_used, 20_000);
        assert_eq!(receipt.native_used, 5_000);
        assert_eq!(receipt.liquidity_minted, 10_000);
        assert_eq!(token.balance_of(&payer), 980_000);
    }

    #[test]
    fn test_rejects_wrong_router_and_expired_deadline() {
        let router_key = Pubkey::new_unique();
        let payer = Pubkey::new_unique();
        let mut router = ConstantProductRouter::new(router_key);
        let mut token = TokenLedger::new(Pubkey::new_unique());

        let wrong = request(Pubkey::new_unique(), payer, 1, 1);
        assert!(matches!(
            router.add_liquidity_with_native(&mut token, &wrong),
            Err(RouterError::UnknownRouter { .. })
        ));

        let mut late = request(router_key, payer, 1, 1);
        late.now = 101;
        assert!(matches!(
            router.add_liquidity_with_native(&mut token, &late),
            Err(RouterError::DeadlineExpired { deadline: 100, now: 101 })
        ));
    }

    #[test]
    fn test_remove_restores_pool_and_tokens() {
        let router_key = Pubkey::new_unique();
        let payer = Pubkey::new_unique();
        let mut router = ConstantProductRouter::new(router_key);
        let mut token = TokenLedger::new(Pubkey::new_unique());
        token.mint_to(&payer, 9).unwrap();
        token.approve(&payer, &router_key, 9).unwrap();

        let receipt = router
            .add_liquidity_with_native(&mut token, &request(router_key, payer, 9, 4))
            .unwrap();
        router
            .remove_liquidity_with_native(&mut token, &receipt, &payer)
            .unwrap();
        assert_eq!(router.reserves(), (0, 0));
        assert_eq!(router.total_liquidity(), 0);
        assert_eq!(token.balance_of(&payer), 9);

        assert_eq!(
            router.remove_liquidity_with_native(&mut token, &receipt, &payer),
            Err(RouterError::UnknownPosition)
        );
    }
}
