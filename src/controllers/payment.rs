use axum::{extract::State, http::StatusCode, Extension, Json};
use std::sync::Arc;

use crate::{
    domain::payment::{
        CreateOrderRequest, CreateOrderResponse, PaymentClaim, PaymentService, PaymentVerified,
    },
    error::AppResult,
    infrastructure::auth::AuthUser,
};

pub struct PaymentController {
    payment_service: Arc<PaymentService>,
}

impl PaymentController {
    pub fn new(payment_service: Arc<PaymentService>) -> Self {
        Self { payment_service }
    }

    /// POST /api/payment/order - Create a gateway order
    pub async fn create_order(
        State(controller): State<Arc<PaymentController>>,
        Extension(_auth_user): Extension<AuthUser>,
        Json(request): Json<CreateOrderRequest>,
    ) -> AppResult<(StatusCode, Json<CreateOrderResponse>)> {
        let order_id = controller
            .payment_service
            .create_order(request.amount, &request.currency)
            .await
            .map_err(crate::error::AppError::from)?;

        Ok((StatusCode::CREATED, Json(CreateOrderResponse { order_id })))
    }

    /// POST /api/payment/verify - Verify a payment claim and activate the
    /// paid plan
    pub async fn verify_order(
        State(controller): State<Arc<PaymentController>>,
        Extension(auth_user): Extension<AuthUser>,
        Json(claim): Json<PaymentClaim>,
    ) -> AppResult<Json<PaymentVerified>> {
        let verified = controller
            .payment_service
            .verify_and_activate(auth_user.user_id, claim)
            .await
            .map_err(crate::error::AppError::from)?;

        Ok(Json(verified))
    }
}
